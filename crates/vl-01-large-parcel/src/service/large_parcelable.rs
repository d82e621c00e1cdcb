//! Stateful large-payload parcelable.
//!
//! Wraps one optional message. The first write decides the placement and
//! caches the resulting envelope, so a message written to several parcels
//! is encoded and spilled only once. Every write hands the parcel its own
//! duplicate of the shared-memory descriptor.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{Envelope, Presence, TransportConfig};
use crate::error::ParcelError;
use crate::ports::Parcel;
use crate::service::transport::PayloadTransport;

#[derive(Debug)]
enum Placement {
    Undecided,
    Decided(Envelope),
}

/// A message that knows how to cross a parcel boundary.
#[derive(Debug)]
pub struct LargeParcelable<T> {
    payload: Option<T>,
    placement: Placement,
    materialized: bool,
    transport: PayloadTransport,
}

impl<T> LargeParcelable<T> {
    pub fn new(payload: Option<T>) -> Self {
        Self::with_config(payload, TransportConfig::default())
    }

    pub fn with_config(payload: Option<T>, config: TransportConfig) -> Self {
        Self {
            payload,
            placement: Placement::Undecided,
            materialized: false,
            transport: PayloadTransport::new(config),
        }
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    /// Replace the message. The cached placement is discarded.
    pub fn set_payload(&mut self, payload: Option<T>) {
        self.payload = payload;
        self.placement = Placement::Undecided;
        self.materialized = false;
    }

    /// Whether this instance was read from a parcel and carries a value.
    pub fn has_materialized_payload(&self) -> bool {
        self.materialized
    }

    /// Placement chosen by the first write, if any.
    pub fn placement_presence(&self) -> Option<Presence> {
        match &self.placement {
            Placement::Undecided => None,
            Placement::Decided(envelope) => Some(envelope.presence()),
        }
    }
}

impl<T: Serialize> LargeParcelable<T> {
    pub fn write_to_parcel<P: Parcel + ?Sized>(&mut self, parcel: &mut P) -> Result<(), ParcelError> {
        if let Placement::Undecided = self.placement {
            let envelope = self.transport.serialize_optional(self.payload.as_ref())?;
            self.placement = Placement::Decided(envelope);
        }
        match &self.placement {
            Placement::Decided(envelope) => envelope.write_to_parcel(parcel),
            Placement::Undecided => Err(ParcelError::serialization("placement not decided")),
        }
    }
}

impl<T: DeserializeOwned> LargeParcelable<T> {
    pub fn read_from_parcel<P: Parcel + ?Sized>(parcel: &mut P) -> Result<Self, ParcelError> {
        let envelope = Envelope::read_from_parcel(parcel)?;
        let transport = PayloadTransport::default();
        let payload = transport.deserialize(&envelope)?;
        Ok(Self {
            materialized: payload.is_some(),
            payload,
            placement: Placement::Undecided,
            transport,
        })
    }
}
