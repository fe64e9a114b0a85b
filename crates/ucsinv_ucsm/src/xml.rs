//! XML API request bodies and response parsing.

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use ucsinv_io_xlsx::Record;

use crate::spec::{SpecUcsmSession, UcsmError};

pub const C_METHOD_LOGIN: &str = "aaaLogin";
pub const C_METHOD_LOGOUT: &str = "aaaLogout";
pub const C_METHOD_RESOLVE_CLASS: &str = "configResolveClass";

/// Parsed XML API response: root attributes plus managed objects under `outConfigs`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXmlResponse {
    /// Root element name (the method).
    pub method: String,
    /// Root element attributes.
    pub attributes: IndexMap<String, String>,
    /// Direct children of `outConfigs`, in document order.
    pub objects: Vec<Record>,
}

pub fn create_login_request(username: &str, password: &str) -> String {
    format!(
        r#"<{C_METHOD_LOGIN} inName="{}" inPassword="{}" />"#,
        escape(username),
        escape(password)
    )
}

pub fn create_logout_request(cookie: &str) -> String {
    format!(r#"<{C_METHOD_LOGOUT} inCookie="{}" />"#, escape(cookie))
}

/// Non-hierarchical class query.
pub fn create_resolve_class_request(cookie: &str, class_id: &str) -> String {
    format!(
        r#"<{C_METHOD_RESOLVE_CLASS} cookie="{}" classId="{}" inHierarchical="false" />"#,
        escape(cookie),
        escape(&derive_xml_class_id(class_id))
    )
}

/// Class ids go on the wire with a lower-case first letter (`ComputeBlade` -> `computeBlade`).
pub fn derive_xml_class_id(class_id: &str) -> String {
    let mut chars = class_id.trim().chars();
    match chars.next() {
        Some(chr_first) => chr_first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse any XML API response, failing on `errorCode`.
pub fn parse_response(body: &str, method: &str) -> Result<SpecXmlResponse, UcsmError> {
    let derive_xml_error = |message: String| UcsmError::Xml {
        method: method.to_string(),
        message,
    };

    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut response: Option<SpecXmlResponse> = None;
    let mut l_stack: Vec<String> = Vec::new();
    loop {
        let event = reader
            .read_event()
            .map_err(|err| derive_xml_error(err.to_string()))?;
        match event {
            Event::Start(e) => {
                let c_name = read_element(&e, &l_stack, &mut response)
                    .map_err(&derive_xml_error)?;
                l_stack.push(c_name);
            }
            Event::Empty(e) => {
                read_element(&e, &l_stack, &mut response).map_err(&derive_xml_error)?;
            }
            Event::End(_) => {
                l_stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let response = response.ok_or_else(|| derive_xml_error("empty document".to_string()))?;
    if let Some(c_code) = response.attributes.get("errorCode") {
        return Err(UcsmError::Api {
            method: response.method.clone(),
            code: c_code.clone(),
            descr: response
                .attributes
                .get("errorDescr")
                .cloned()
                .unwrap_or_default(),
        });
    }
    if response.method != method {
        return Err(derive_xml_error(format!(
            "expected <{method}>, got <{}>",
            response.method
        )));
    }
    Ok(response)
}

pub fn parse_login_response(body: &str) -> Result<SpecUcsmSession, UcsmError> {
    let response = parse_response(body, C_METHOD_LOGIN)?;
    let cookie = response
        .attributes
        .get("outCookie")
        .filter(|c_cookie| !c_cookie.is_empty())
        .cloned()
        .ok_or(UcsmError::MissingCookie)?;

    Ok(SpecUcsmSession {
        cookie,
        refresh_period: response
            .attributes
            .get("outRefreshPeriod")
            .and_then(|val| val.parse().ok()),
        privileges: response.attributes.get("outPriv").cloned(),
        version: response.attributes.get("outVersion").cloned(),
    })
}

pub fn parse_resolve_class_response(body: &str) -> Result<Vec<Record>, UcsmError> {
    Ok(parse_response(body, C_METHOD_RESOLVE_CLASS)?.objects)
}

/// Handle one opening/empty element; return its name.
fn read_element(
    e: &BytesStart<'_>,
    l_stack: &[String],
    response: &mut Option<SpecXmlResponse>,
) -> Result<String, String> {
    let c_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let dict_attrs = read_attributes(e)?;

    match l_stack {
        [] => {
            *response = Some(SpecXmlResponse {
                method: c_name.clone(),
                attributes: dict_attrs,
                objects: Vec::new(),
            });
        }
        [_, c_parent] if c_parent == "outConfigs" => {
            if let Some(response) = response.as_mut() {
                let mut record = Record::new(c_name.clone());
                for (c_key, c_value) in dict_attrs {
                    record.insert(c_key, c_value);
                }
                response.objects.push(record);
            }
        }
        _ => {}
    }
    Ok(c_name)
}

fn read_attributes(e: &BytesStart<'_>) -> Result<IndexMap<String, String>, String> {
    let mut dict_attrs = IndexMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let c_key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let c_value = attr
            .unescape_value()
            .map_err(|err| err.to_string())?
            .to_string();
        dict_attrs.insert(c_key, c_value);
    }
    Ok(dict_attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_escape_attribute_values() {
        assert_eq!(
            create_login_request("admin", "p<w>\"&"),
            r#"<aaaLogin inName="admin" inPassword="p&lt;w&gt;&quot;&amp;" />"#
        );
        assert_eq!(
            create_resolve_class_request("1700/abc", "ComputeBlade"),
            r#"<configResolveClass cookie="1700/abc" classId="computeBlade" inHierarchical="false" />"#
        );
        assert_eq!(
            create_logout_request("1700/abc"),
            r#"<aaaLogout inCookie="1700/abc" />"#
        );
    }

    #[test]
    fn test_derive_xml_class_id() {
        assert_eq!(derive_xml_class_id("ComputeBlade"), "computeBlade");
        assert_eq!(derive_xml_class_id("lsServer"), "lsServer");
        assert_eq!(derive_xml_class_id(""), "");
    }

    #[test]
    fn test_parse_login_response_reads_session() {
        let body = r#"<aaaLogin cookie="" response="yes" outCookie="1700000000/9f1c" outRefreshPeriod="600" outPriv="admin,read-only" outVersion="4.2(3b)" outSessionId="web_1" />"#;
        let session = parse_login_response(body).expect("login");

        assert_eq!(session.cookie, "1700000000/9f1c");
        assert_eq!(session.refresh_period, Some(600));
        assert_eq!(session.privileges.as_deref(), Some("admin,read-only"));
        assert_eq!(session.version.as_deref(), Some("4.2(3b)"));
    }

    #[test]
    fn test_parse_login_failure_is_api_error() {
        let body = r#"<aaaLogin cookie="" response="yes" errorCode="551" invocationResult="unidentified-fail" errorDescr="Authentication failed" />"#;
        match parse_login_response(body) {
            Err(UcsmError::Api {
                method,
                code,
                descr,
            }) => {
                assert_eq!(method, "aaaLogin");
                assert_eq!(code, "551");
                assert_eq!(descr, "Authentication failed");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_login_without_cookie_fails() {
        let body = r#"<aaaLogin cookie="" response="yes" outCookie="" />"#;
        assert!(matches!(
            parse_login_response(body),
            Err(UcsmError::MissingCookie)
        ));
    }

    #[test]
    fn test_parse_resolve_class_keeps_document_order() {
        let body = r#"
            <configResolveClass cookie="1700/abc" response="yes" classId="computeBlade">
              <outConfigs>
                <computeBlade dn="sys/chassis-1/blade-2" serial="FCH0002" numOfCpus="2" usrLbl="db &amp; cache"/>
                <computeBlade dn="sys/chassis-1/blade-1" serial="FCH0001" numOfCpus="1">
                  <adaptorUnit dn="sys/chassis-1/blade-1/adaptor-1"/>
                </computeBlade>
              </outConfigs>
            </configResolveClass>"#;
        let l_records = parse_resolve_class_response(body).expect("resolve");

        assert_eq!(l_records.len(), 2);
        assert_eq!(l_records[0].class_id(), "computeBlade");
        assert_eq!(l_records[0].dn(), Some("sys/chassis-1/blade-2"));
        assert_eq!(l_records[0].lookup("usr_lbl"), Some("db & cache"));
        assert_eq!(l_records[1].lookup("num_of_cpus"), Some("1"));
    }

    #[test]
    fn test_parse_resolve_class_empty_out_configs() {
        let body = r#"<configResolveClass cookie="c" response="yes" classId="fooBar"><outConfigs></outConfigs></configResolveClass>"#;
        assert!(parse_resolve_class_response(body).unwrap().is_empty());

        let body = r#"<configResolveClass cookie="c" response="yes" classId="fooBar"><outConfigs/></configResolveClass>"#;
        assert!(parse_resolve_class_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_response_rejects_unexpected_root() {
        assert!(matches!(
            parse_response("<aaaLogout/>", C_METHOD_LOGIN),
            Err(UcsmError::Xml { .. })
        ));
        assert!(matches!(
            parse_response("", C_METHOD_LOGIN),
            Err(UcsmError::Xml { .. })
        ));
    }
}
