use crate::domain::model::Record;
use crate::utils::error::{ColissimoError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub zip_code: String,
    pub city: String,
    pub country_code: Option<String>,
    pub country_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Opening hours as published by the service, e.g. `"09:00-12:00 14:00-18:30"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpeningHours {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holiday {
    pub start: Option<String>,
    pub end: Option<String>,
    pub number: Option<u32>,
}

/// A location where a parcel can be collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupPoint {
    pub id: String,
    pub name: String,
    pub address: Address,
    pub coordinates: Option<Coordinates>,
    pub point_type: Option<String>,
    pub network: Option<String>,
    pub distance_meters: Option<u32>,
    pub max_weight: Option<u32>,
    pub language: Option<String>,
    pub location_hint: Option<String>,
    pub reduced_mobility_access: Option<bool>,
    pub parking: Option<bool>,
    pub handling_tool_loan: Option<bool>,
    pub opening_hours: OpeningHours,
    pub activity_start: Option<String>,
    pub activity_end: Option<String>,
    pub partial_closure: Option<bool>,
    pub full_closure: Option<bool>,
    pub holidays: Vec<Holiday>,
    pub distribution_sort: Option<String>,
    pub routing_lot: Option<String>,
    pub sort_plan_version: Option<String>,
    /// Remote fields without a typed counterpart, copied verbatim.
    pub additional: BTreeMap<String, Value>,
}

const LATITUDE_FIELD: &str = "coordGeolocalisationLatitude";
const LONGITUDE_FIELD: &str = "coordGeolocalisationLongitude";

impl PickupPoint {
    pub const REQUIRED_FIELDS: [&'static str; 5] =
        ["identifiant", "nom", "adresse1", "codePostal", "localite"];

    pub fn from_record(record: &Record) -> Result<Self> {
        let mut fields = FieldReader::new(record.data.clone());

        let address = Address {
            line1: fields.required("adresse1")?,
            line2: fields.text("adresse2"),
            line3: fields.text("adresse3"),
            zip_code: fields.required("codePostal")?,
            city: fields.required("localite")?,
            country_code: fields.text("codePays"),
            country_label: fields.text("libellePays"),
        };

        // A lone half of the pair stays in `additional`.
        let coordinates = if fields.has(LATITUDE_FIELD) && fields.has(LONGITUDE_FIELD) {
            match (fields.float(LATITUDE_FIELD)?, fields.float(LONGITUDE_FIELD)?) {
                (Some(latitude), Some(longitude)) => Some(Coordinates {
                    latitude,
                    longitude,
                }),
                _ => None,
            }
        } else {
            None
        };

        let opening_hours = OpeningHours {
            monday: fields.text("horairesOuvertureLundi"),
            tuesday: fields.text("horairesOuvertureMardi"),
            wednesday: fields.text("horairesOuvertureMercredi"),
            thursday: fields.text("horairesOuvertureJeudi"),
            friday: fields.text("horairesOuvertureVendredi"),
            saturday: fields.text("horairesOuvertureSamedi"),
            sunday: fields.text("horairesOuvertureDimanche"),
        };

        let holidays = fields
            .list("listeConges")
            .into_iter()
            .map(|entry| holiday_from_value(&entry))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: fields.required("identifiant")?,
            name: fields.required("nom")?,
            address,
            coordinates,
            point_type: fields.text("typeDePoint"),
            network: fields.text("reseau"),
            distance_meters: fields.unsigned("distanceEnMetre")?,
            max_weight: fields.unsigned("poidsMaxi")?,
            language: fields.text("langue"),
            location_hint: fields.text("indiceDeLocalisation"),
            reduced_mobility_access: fields.flag("accesPersonneMobiliteReduite")?,
            parking: fields.flag("parking")?,
            handling_tool_loan: fields.flag("loanOfHandlingTool")?,
            opening_hours,
            activity_start: fields.text("periodeActiviteHoraireDeb"),
            activity_end: fields.text("periodeActiviteHoraireFin"),
            partial_closure: fields.flag("congesPartiel")?,
            full_closure: fields.flag("congesTotal")?,
            holidays,
            distribution_sort: fields.text("distributionSort"),
            routing_lot: fields.text("lotAcheminement"),
            sort_plan_version: fields.text("versionPlanTri"),
            additional: fields.into_remaining(),
        })
    }
}

fn holiday_from_value(value: &Value) -> Result<Holiday> {
    let record = Record::from_value("listeConges", value.clone())?;
    let mut fields = FieldReader::new(record.data);

    Ok(Holiday {
        start: fields.text("calendarDeDebut"),
        end: fields.text("calendarDeFin"),
        number: fields.unsigned("numero")?,
    })
}

/// Removes fields from a record as they get mapped; whatever is left over
/// ends up in `PickupPoint::additional`.
struct FieldReader {
    fields: Map<String, Value>,
}

impl FieldReader {
    fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    fn required(&mut self, name: &str) -> Result<String> {
        self.text(name).ok_or_else(|| ColissimoError::MissingField {
            field: name.to_string(),
        })
    }

    fn has(&self, name: &str) -> bool {
        match self.fields.get(name) {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }

    /// Empty strings count as absent. Anything else is returned as sent.
    fn text(&mut self, name: &str) -> Option<String> {
        match self.fields.remove(name) {
            Some(Value::String(s)) => (!s.is_empty()).then_some(s),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }

    fn float(&mut self, name: &str) -> Result<Option<f64>> {
        self.parsed(name, "expected a finite decimal number", |raw| {
            raw.replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
        })
    }

    fn unsigned(&mut self, name: &str) -> Result<Option<u32>> {
        self.parsed(name, "expected a non-negative integer", |raw| {
            raw.parse::<u32>().ok()
        })
    }

    fn flag(&mut self, name: &str) -> Result<Option<bool>> {
        self.parsed(name, "expected a boolean", |raw| {
            match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            }
        })
    }

    fn parsed<T>(
        &mut self,
        name: &str,
        reason: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>> {
        let Some(raw) = self.text(name) else {
            return Ok(None);
        };

        parse(raw.trim())
            .map(Some)
            .ok_or_else(|| ColissimoError::InvalidField {
                field: name.to_string(),
                value: raw,
                reason: reason.to_string(),
            })
    }

    /// Repeated elements decode to an array, a single one to a bare value.
    fn list(&mut self, name: &str) -> Vec<Value> {
        match self.fields.remove(name) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
            Some(single) => vec![single],
        }
    }

    fn into_remaining(self) -> BTreeMap<String, Value> {
        self.fields.into_iter().collect()
    }
}
