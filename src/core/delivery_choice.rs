//! Delivery choice web service: pickup point lookups.
//!
//! <https://www.colissimo.entreprise.laposte.fr/system/files/imagescontent/docs/spec_ws_livraison.pdf>

use crate::adapters::soap::{ClientOptions, SoapClient};
use crate::config::ConfigProvider;
use crate::core::{Credentials, Parameters, PickupPoint, Record, RemoteOutcome, Transport};
use crate::utils::error::{ColissimoError, Result};
use serde_json::{Map, Value};

pub const FIND_PICKUP_POINTS_OPERATION: &str = "findRDVPointRetraitAcheminement";
pub const FIND_PICKUP_POINT_BY_ID_OPERATION: &str = "findPointRetraitAcheminementByID";

const PICKUP_POINT_LIST_FIELD: &str = "listePointRetraitAcheminement";
const PICKUP_POINT_FIELD: &str = "pointRetraitAcheminement";

pub struct DeliveryChoice<T: Transport = SoapClient> {
    transport: T,
}

impl DeliveryChoice<SoapClient> {
    /// Fails on invalid credentials or endpoint, before any remote call.
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        Ok(Self::with_transport(SoapClient::new(credentials, options)?))
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.credentials()?, config.client_options())
    }
}

impl<T: Transport> DeliveryChoice<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Retrieves available pickup points around a location.
    ///
    /// `shipping_date` is `DD/MM/YYYY`. Keys of `extra_options` override the
    /// computed parameters on collision.
    pub async fn find_pickup_points(
        &self,
        city: &str,
        zip_code: &str,
        country_code: &str,
        shipping_date: &str,
        extra_options: Parameters,
    ) -> Result<Vec<PickupPoint>> {
        let params = Parameters::new()
            .with("city", city)
            .with("zipCode", zip_code)
            .with("countryCode", country_code)
            .with("shippingDate", shipping_date)
            .merge(extra_options);

        let mut payload = self.call(FIND_PICKUP_POINTS_OPERATION, &params).await?;

        let points = records(payload.remove(PICKUP_POINT_LIST_FIELD))
            .into_iter()
            .map(|value| {
                let record = Record::from_value(PICKUP_POINT_LIST_FIELD, value)?;
                PickupPoint::from_record(&record)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Found {} pickup point(s) for {} {}", points.len(), zip_code, city);
        Ok(points)
    }

    /// Retrieves a single pickup point by its identifier.
    pub async fn find_pickup_point_by_id(
        &self,
        id: u64,
        shipping_date: &str,
        extra_options: Parameters,
    ) -> Result<PickupPoint> {
        let params = Parameters::new()
            .with("id", id.to_string())
            .with("date", shipping_date)
            .merge(extra_options);

        let mut payload = self.call(FIND_PICKUP_POINT_BY_ID_OPERATION, &params).await?;

        let value = payload
            .remove(PICKUP_POINT_FIELD)
            .ok_or_else(|| ColissimoError::MissingField {
                field: PICKUP_POINT_FIELD.to_string(),
            })?;
        let record = Record::from_value(PICKUP_POINT_FIELD, value)?;

        PickupPoint::from_record(&record)
    }

    async fn call(&self, operation: &str, params: &Parameters) -> Result<Map<String, Value>> {
        let result = self.transport.invoke(operation, params).await?;

        match RemoteOutcome::from_return(result)? {
            RemoteOutcome::Success(payload) => Ok(payload),
            RemoteOutcome::Failure { code, message } => {
                tracing::warn!("{} failed with code {}: {}", operation, code, message);
                Err(ColissimoError::RemoteError { code, message })
            }
        }
    }
}

/// The list field is absent when empty and a bare object when it holds one record.
fn records(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
        Some(single) => vec![single],
    }
}
