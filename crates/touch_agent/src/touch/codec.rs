//! Raw kernel `input_event` records and the tap event sequence

pub const EV_SYN: u16 = 0x00;
pub const EV_ABS: u16 = 0x03;

pub const SYN_REPORT: u16 = 0;
pub const SYN_MT_REPORT: u16 = 2;

pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;

/// Bytes per record: two zeroed 8-byte time fields, type, code, value
pub const INPUT_EVENT_SIZE: usize = 24;

/// Position groups emitted before the closing sync pair. Some emulated
/// touch drivers only register the tap when the group is sent twice.
pub const TAP_POSITION_REPEATS: usize = 2;

/// Events in one tap: `TAP_POSITION_REPEATS` groups of four, then a sync pair
pub const TAP_EVENT_COUNT: usize = TAP_POSITION_REPEATS * 4 + 2;

/// One `input_event` with zero timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub const fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
        }
    }

    pub const fn abs(code: u16, value: i32) -> Self {
        Self::new(EV_ABS, code, value)
    }

    /// End of one contact's report
    pub const fn mt_sync() -> Self {
        Self::new(EV_SYN, SYN_MT_REPORT, 0)
    }

    /// End of the event frame
    pub const fn report_sync() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    /// Little-endian record with zeroed time fields
    pub fn to_bytes(&self) -> [u8; INPUT_EVENT_SIZE] {
        let mut buf = [0u8; INPUT_EVENT_SIZE];
        buf[16..18].copy_from_slice(&self.event_type.to_le_bytes());
        buf[18..20].copy_from_slice(&self.code.to_le_bytes());
        buf[20..24].copy_from_slice(&self.value.to_le_bytes());
        buf
    }

    /// Read a record, ignoring its time fields
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < INPUT_EVENT_SIZE {
            return None;
        }
        Some(Self {
            event_type: u16::from_le_bytes([buf[16], buf[17]]),
            code: u16::from_le_bytes([buf[18], buf[19]]),
            value: i32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]),
        })
    }
}

/// Concatenate the records of `events` in order
pub fn encode(events: &[InputEvent]) -> Vec<u8> {
    events.iter().flat_map(|event| event.to_bytes()).collect()
}

/// Split a buffer back into records; a trailing partial record is dropped
pub fn decode(buf: &[u8]) -> Vec<InputEvent> {
    buf.chunks_exact(INPUT_EVENT_SIZE)
        .filter_map(InputEvent::from_bytes)
        .collect()
}

/// The single-point touch sequence for device coordinates `(x, y)`
pub fn tap_sequence(x: i32, y: i32) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(TAP_EVENT_COUNT);
    for _ in 0..TAP_POSITION_REPEATS {
        events.push(InputEvent::abs(ABS_MT_POSITION_X, x));
        events.push(InputEvent::abs(ABS_MT_POSITION_Y, y));
        events.push(InputEvent::mt_sync());
        events.push(InputEvent::report_sync());
    }
    events.push(InputEvent::mt_sync());
    events.push(InputEvent::report_sync());
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event_layout() {
        let bytes = encode(&[InputEvent::new(0x0003, 0x0035, 0x0102_0304)]);

        assert_eq!(bytes.len(), 24);
        assert!(bytes[..16].iter().all(|&b| b == 0));
        assert_eq!(&bytes[16..18], &[0x03, 0x00]);
        assert_eq!(&bytes[18..20], &[0x35, 0x00]);
        assert_eq!(&bytes[20..24], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_negative_value_is_twos_complement() {
        let bytes = InputEvent::abs(ABS_MT_POSITION_X, -1).to_bytes();
        assert_eq!(&bytes[20..24], &[0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_encode_concatenates() {
        let a = [InputEvent::abs(ABS_MT_POSITION_X, 10)];
        let b = [InputEvent::abs(ABS_MT_POSITION_Y, 20), InputEvent::report_sync()];
        let joined: Vec<InputEvent> = a.iter().chain(b.iter()).copied().collect();

        let mut expected = encode(&a);
        expected.extend(encode(&b));
        assert_eq!(encode(&joined), expected);
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn test_decode_recovers_events() {
        let events = tap_sequence(2048, 1024);
        let mut buf = encode(&events);
        buf.extend_from_slice(&[0u8; 5]);

        assert_eq!(decode(&buf), events);
    }

    #[test]
    fn test_tap_sequence_shape() {
        let events = tap_sequence(100, 200);
        let x = InputEvent::abs(ABS_MT_POSITION_X, 100);
        let y = InputEvent::abs(ABS_MT_POSITION_Y, 200);
        let mt = InputEvent::mt_sync();
        let syn = InputEvent::report_sync();

        assert_eq!(events.len(), TAP_EVENT_COUNT);
        assert_eq!(events, vec![x, y, mt, syn, x, y, mt, syn, mt, syn]);
        assert_eq!(encode(&events).len(), 240);
    }
}
