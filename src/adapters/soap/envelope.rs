use crate::domain::model::{Credentials, Parameters};
use crate::utils::error::{ColissimoError, Result};
use quick_xml::escape::escape;

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SERVICE_NS: &str = "http://v2.pointretrait.geopost.com/";

const LOGIN_ELEMENT: &str = "accountNumber";
const PASSWORD_ELEMENT: &str = "password";

/// Builds the SOAP 1.1 request body for `operation`.
///
/// Credentials come first as `accountNumber` / `password`, followed by the
/// parameters in insertion order. Parameter names must be valid element names
/// and may not collide with the credential elements.
pub fn build_request(
    operation: &str,
    credentials: &Credentials,
    params: &Parameters,
) -> Result<String> {
    check_element_name(operation)?;
    for (key, _) in params.iter() {
        check_element_name(key)?;
        if key == LOGIN_ELEMENT || key == PASSWORD_ELEMENT {
            return Err(ColissimoError::InvalidField {
                field: "parameter".to_string(),
                value: key.to_string(),
                reason: "reserved for credentials".to_string(),
            });
        }
    }

    let mut body = String::with_capacity(512);

    body.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    body.push_str(&format!(
        r#"<soapenv:Envelope xmlns:soapenv="{}" xmlns:v2="{}">"#,
        SOAP_ENVELOPE_NS, SERVICE_NS
    ));
    body.push_str("<soapenv:Header/><soapenv:Body>");
    body.push_str(&format!("<v2:{}>", operation));

    push_element(&mut body, LOGIN_ELEMENT, credentials.login());
    push_element(&mut body, PASSWORD_ELEMENT, credentials.password());
    for (key, value) in params.iter() {
        push_element(&mut body, key, value);
    }

    body.push_str(&format!("</v2:{}>", operation));
    body.push_str("</soapenv:Body></soapenv:Envelope>");
    Ok(body)
}

fn check_element_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');

    if valid {
        Ok(())
    } else {
        Err(ColissimoError::InvalidField {
            field: "parameter".to_string(),
            value: name.to_string(),
            reason: "not a valid XML element name".to_string(),
        })
    }
}

fn push_element(body: &mut String, name: &str, value: &str) {
    body.push('<');
    body.push_str(name);
    body.push('>');
    body.push_str(&escape(value));
    body.push_str("</");
    body.push_str(name);
    body.push('>');
}
