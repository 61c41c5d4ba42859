use dtlv_wire::frame::tag;

/// Semantic record tags.
///
/// Each variant maps to the wire byte from `dtlv_wire::frame::tag`.
/// Any other byte is kept as `Unknown(u8)` so it can be reported (and
/// skipped) without losing the value.
///
/// ```text
/// ┌──────┬────────────────┬──────────────────────────────────────┐
/// │ Wire │ Variant        │ Description                          │
/// ├──────┼────────────────┼──────────────────────────────────────┤
/// │ 0x01 │ CalibrationA   │ Calibration block A                  │
/// │ 0x02 │ CalibrationB   │ Calibration block B                  │
/// │ 0x03 │ CalibrationC   │ Calibration block C                  │
/// │ 0x10 │ DtcLog         │ Diagnostic trouble code log entry    │
/// │ 0x20 │ SensorPayload  │ ADAS sensor packet payload           │
/// │ 0x30 │ FirmwareChunk  │ Firmware update chunk                │
/// │ 0x40 │ DidData        │ UDS ReadDataByIdentifier data        │
/// └──────┴────────────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordTag {
    CalibrationA,
    CalibrationB,
    CalibrationC,
    DtcLog,
    SensorPayload,
    FirmwareChunk,
    DidData,
    Unknown(u8),
}

impl RecordTag {
    /// Every named tag, in wire order.
    pub const KNOWN: [Self; 7] = [
        Self::CalibrationA,
        Self::CalibrationB,
        Self::CalibrationC,
        Self::DtcLog,
        Self::SensorPayload,
        Self::FirmwareChunk,
        Self::DidData,
    ];

    #[must_use]
    pub fn wire_id(self) -> u8 {
        match self {
            Self::CalibrationA => tag::CALIBRATION_A,
            Self::CalibrationB => tag::CALIBRATION_B,
            Self::CalibrationC => tag::CALIBRATION_C,
            Self::DtcLog => tag::DTC_LOG,
            Self::SensorPayload => tag::SENSOR_PAYLOAD,
            Self::FirmwareChunk => tag::FIRMWARE_CHUNK,
            Self::DidData => tag::DID_DATA,
            Self::Unknown(id) => id,
        }
    }

    #[must_use]
    pub fn from_wire_id(id: u8) -> Self {
        match id {
            tag::CALIBRATION_A => Self::CalibrationA,
            tag::CALIBRATION_B => Self::CalibrationB,
            tag::CALIBRATION_C => Self::CalibrationC,
            tag::DTC_LOG => Self::DtcLog,
            tag::SENSOR_PAYLOAD => Self::SensorPayload,
            tag::FIRMWARE_CHUNK => Self::FirmwareChunk,
            tag::DID_DATA => Self::DidData,
            other => Self::Unknown(other),
        }
    }

    /// Short lowercase name, used by the CLI and in log fields.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CalibrationA => "calibration_a",
            Self::CalibrationB => "calibration_b",
            Self::CalibrationC => "calibration_c",
            Self::DtcLog => "dtc_log",
            Self::SensorPayload => "sensor_payload",
            Self::FirmwareChunk => "firmware_chunk",
            Self::DidData => "did_data",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl From<u8> for RecordTag {
    fn from(id: u8) -> Self {
        Self::from_wire_id(id)
    }
}
