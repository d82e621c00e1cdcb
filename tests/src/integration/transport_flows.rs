//! # Transport Flows
//!
//! Payloads leaving one side as an envelope and arriving on the other:
//!
//! ```text
//! message ──serialize──→ Envelope ──Parcel──→ (socket / in-memory) ──Parcel──→ Envelope ──deserialize──→ message
//!                          │
//!                          ├── ≤ 4096 bytes: inline bytes
//!                          └── > 4096 bytes: shared-memory descriptor
//! ```

#[cfg(test)]
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SensorSample {
    sensor_id: u32,
    reading: f64,
    label: String,
}

// =============================================================================
// TEST FIXTURES (only compiled during tests)
// =============================================================================

#[cfg(test)]
fn samples(count: u32) -> Vec<SensorSample> {
    (0..count)
        .map(|i| SensorSample {
            sensor_id: i,
            reading: f64::from(i) * 0.5,
            label: format!("wheel-speed-{}", i % 4),
        })
        .collect()
}

#[cfg(test)]
fn diagnostic_record() -> SensorSample {
    SensorSample {
        sensor_id: 7,
        reading: 98.6,
        label: "d".repeat(180),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::init_test_logging;

    use std::fs::File;
    use std::io::Write;
    use std::os::fd::OwnedFd;
    use std::os::unix::net::UnixStream;

    use vl_01_large_parcel::adapters::{recv_parcel, send_parcel};
    use vl_01_large_parcel::{
        Envelope, InMemoryParcel, LargeParcelable, Parcel, ParcelEncode, ParcelError,
        PayloadTransport, Presence, TransportConfig, MAX_DIRECT_PAYLOAD_SIZE,
    };

    // =========================================================================
    // Placement
    // =========================================================================

    #[test]
    fn test_ten_thousand_records_travel_through_shared_memory() {
        init_test_logging();
        let records = samples(10_000);
        let mut message = LargeParcelable::new(Some(records.clone()));

        let mut parcel = InMemoryParcel::new();
        message.write_to_parcel(&mut parcel).unwrap();
        assert_eq!(message.placement_presence(), Some(Presence::SharedMemory));
        assert_eq!(parcel.file_descriptors().len(), 1);
        assert!(parcel.data().len() < MAX_DIRECT_PAYLOAD_SIZE);

        parcel.set_data_position(0).unwrap();
        let received = LargeParcelable::<Vec<SensorSample>>::read_from_parcel(&mut parcel).unwrap();
        let received = received.into_payload().unwrap();
        assert_eq!(received.len(), 10_000);
        assert_eq!(received, records);
    }

    #[test]
    fn test_small_record_stays_inline() {
        let record = diagnostic_record();
        let transport = PayloadTransport::new(TransportConfig::default());

        let envelope = transport.serialize(&record).unwrap();
        match &envelope {
            Envelope::Inline(bytes) => assert!(bytes.len() <= MAX_DIRECT_PAYLOAD_SIZE),
            other => panic!("expected inline, got {}", other.presence()),
        }
        let decoded: SensorSample = transport.deserialize(&envelope).unwrap().unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let transport = PayloadTransport::new(TransportConfig::default());

        // A byte vector encodes as an 8-byte length plus its contents.
        let at_limit = vec![0xA5u8; MAX_DIRECT_PAYLOAD_SIZE - 8];
        assert_eq!(at_limit.encoded_len().unwrap(), MAX_DIRECT_PAYLOAD_SIZE);
        assert_eq!(
            transport.serialize(&at_limit).unwrap().presence(),
            Presence::Inline
        );

        let over_limit = vec![0xA5u8; MAX_DIRECT_PAYLOAD_SIZE - 7];
        let envelope = transport.serialize(&over_limit).unwrap();
        assert_eq!(envelope.presence(), Presence::SharedMemory);
        let decoded: Vec<u8> = transport.deserialize(&envelope).unwrap().unwrap();
        assert_eq!(decoded, over_limit);
    }

    #[test]
    fn test_lowered_threshold_spills_small_payloads() {
        let transport =
            PayloadTransport::new(TransportConfig::default().with_max_direct_payload_size(16));
        let envelope = transport.serialize(&diagnostic_record()).unwrap();
        assert_eq!(envelope.presence(), Presence::SharedMemory);

        let decoded: SensorSample = transport.deserialize(&envelope).unwrap().unwrap();
        assert_eq!(decoded, diagnostic_record());
    }

    // =========================================================================
    // Socket hop
    // =========================================================================

    #[test]
    fn test_shared_memory_envelope_crosses_socket() {
        init_test_logging();
        let (sender, receiver) = UnixStream::pair().unwrap();
        let records = samples(2_000);
        let transport = PayloadTransport::new(TransportConfig::default());

        {
            let envelope = transport.serialize_vector(&records).unwrap();
            assert_eq!(envelope.presence(), Presence::SharedMemory);
            let mut parcel = InMemoryParcel::new();
            envelope.write_to_parcel(&mut parcel).unwrap();
            send_parcel(&sender, &parcel).unwrap();
        }

        // Every sender-side descriptor is closed by now; the region lives on
        // through the one in flight.
        let mut parcel = recv_parcel(&receiver).unwrap();
        assert_eq!(parcel.file_descriptors().len(), 1);
        let envelope = Envelope::read_from_parcel(&mut parcel).unwrap();
        assert_eq!(envelope.presence(), Presence::SharedMemory);

        let decoded: Vec<SensorSample> = transport.deserialize_vector(&envelope).unwrap().unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_several_envelopes_share_one_frame() {
        let (sender, receiver) = UnixStream::pair().unwrap();
        let transport = PayloadTransport::new(TransportConfig::default());

        let mut parcel = InMemoryParcel::new();
        transport
            .serialize_optional::<SensorSample>(None)
            .unwrap()
            .write_to_parcel(&mut parcel)
            .unwrap();
        transport
            .serialize(&diagnostic_record())
            .unwrap()
            .write_to_parcel(&mut parcel)
            .unwrap();
        transport
            .serialize_vector(&samples(500))
            .unwrap()
            .write_to_parcel(&mut parcel)
            .unwrap();
        send_parcel(&sender, &parcel).unwrap();

        let mut parcel = recv_parcel(&receiver).unwrap();
        let first = Envelope::read_from_parcel(&mut parcel).unwrap();
        let second = Envelope::read_from_parcel(&mut parcel).unwrap();
        let third = Envelope::read_from_parcel(&mut parcel).unwrap();

        assert!(first.is_null());
        assert_eq!(
            transport.deserialize::<SensorSample>(&first).unwrap(),
            None
        );
        assert_eq!(second.presence(), Presence::Inline);
        assert_eq!(
            transport.deserialize::<SensorSample>(&second).unwrap(),
            Some(diagnostic_record())
        );
        assert_eq!(third.presence(), Presence::SharedMemory);
        assert_eq!(
            transport.deserialize_vector::<SensorSample>(&third).unwrap(),
            Some(samples(500))
        );
    }

    #[test]
    fn test_streaming_decode_reads_from_shared_memory() {
        let transport = PayloadTransport::new(TransportConfig::default());
        let envelope = transport.serialize_vector(&samples(10_000)).unwrap();

        let mut next_id = 0u32;
        let delivered = transport
            .for_each_in_vector(&envelope, |sample: SensorSample| {
                assert_eq!(sample.sensor_id, next_id);
                next_id += 1;
            })
            .unwrap();
        assert_eq!(delivered, 10_000);
    }

    // =========================================================================
    // Foreign regions
    // =========================================================================

    fn region_file(header: u32, payload: &[u8]) -> File {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(&header.to_le_bytes()).unwrap();
        file.write_all(payload).unwrap();
        file
    }

    #[test]
    fn test_region_backed_by_regular_file() {
        let payload = samples(3).encode().unwrap();
        let file = region_file(payload.len() as u32, &payload);

        let envelope = Envelope::SharedMemory(OwnedFd::from(file));
        let decoded: Vec<SensorSample> = vl_01_large_parcel::deserialize(&envelope)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, samples(3));
    }

    #[test]
    fn test_region_shorter_than_its_header_claims() {
        let payload = samples(3).encode().unwrap();
        let file = region_file(payload.len() as u32 + 64, &payload);

        let envelope = Envelope::SharedMemory(OwnedFd::from(file));
        let err = vl_01_large_parcel::deserialize::<Vec<SensorSample>>(&envelope).unwrap_err();
        assert!(matches!(err, ParcelError::Deserialization { .. }));
    }

    #[test]
    fn test_region_without_header() {
        let file = tempfile::tempfile().unwrap();
        file.set_len(2).unwrap();

        let envelope = Envelope::SharedMemory(OwnedFd::from(file));
        assert!(vl_01_large_parcel::deserialize::<SensorSample>(&envelope).is_err());
    }
}
