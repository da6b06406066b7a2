use crate::error::{Error, ParseError};
use crate::request::{Member, MethodCall};
use crate::response::{Response, ResponseKind, ZoneRecord};
use crate::transport::{HttpTransport, Transport};

use log::{debug, trace};

use std::fmt;

/// The production endpoint of Loopia's XML-RPC API.
pub const DEFAULT_BASE_URL: &str = "https://api.loopia.se/RPCSERV";

const STATUS_OK: &str = "OK";
const STATUS_AUTH_ERROR: &str = "AUTH_ERROR";

/// A Loopia API client.
///
/// The client is immutable once built. Every operation performs exactly one request, so a single
/// client can be shared between threads and used concurrently. Nothing is retried: errors are
/// returned to the caller as soon as they occur.
#[derive(Clone)]
pub struct Client<T = HttpTransport> {
    api_user: String,
    api_password: String,
    base_url: String,
    transport: T,
}

impl Client<HttpTransport> {
    /// Creates a client for the default endpoint, using an `HttpTransport` with the default
    /// timeout.
    pub fn new<U: Into<String>, P: Into<String>>(api_user: U, api_password: P) -> Result<Self, Error> {
        Ok(Self::with_transport(api_user, api_password, HttpTransport::new()?))
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client for the default endpoint that sends its calls through `transport`.
    pub fn with_transport<U: Into<String>, P: Into<String>>(api_user: U, api_password: P, transport: T) -> Self {
        Client {
            api_user: api_user.into(),
            api_password: api_password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport,
        }
    }

    /// Sends all calls to `base_url` instead of [`DEFAULT_BASE_URL`].
    ///
    /// [`DEFAULT_BASE_URL`]: constant.DEFAULT_BASE_URL.html
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The endpoint calls are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The transport calls are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Adds a TXT record with the given `ttl` and text to `subdomain` of `domain`.
    pub fn add_txt_record(&self, domain: &str, subdomain: &str, ttl: i32, value: &str) -> Result<(), Error> {
        let call = self
            .call("addZoneRecord")
            .arg(domain)
            .arg(subdomain)
            .arg(vec![
                Member::string("type", "TXT"),
                Member::int("ttl", ttl),
                Member::int("priority", 0),
                Member::string("rdata", value),
                Member::int("record_id", 0),
            ]);

        self.status_call(&call)
    }

    /// Removes the record with id `record_id` from `subdomain` of `domain`.
    pub fn remove_txt_record(&self, domain: &str, subdomain: &str, record_id: i32) -> Result<(), Error> {
        let call = self
            .call("removeZoneRecord")
            .arg(domain)
            .arg(subdomain)
            .arg(record_id);

        self.status_call(&call)
    }

    /// Lists the records of `subdomain` of `domain`, in the order the server returns them.
    ///
    /// The list may be empty. Only faults and transport or decoding failures are errors; this
    /// method does not use the `OK`/`AUTH_ERROR` status convention.
    pub fn get_txt_records(&self, domain: &str, subdomain: &str) -> Result<Vec<ZoneRecord>, Error> {
        let call = self.call("getZoneRecords").arg(domain).arg(subdomain);

        match self.rpc_call(&call, ResponseKind::Records)? {
            Response::Records(records) => Ok(records),
            other => Err(mismatch("record list", &other)),
        }
    }

    /// Removes `subdomain` of `domain` together with all of its records.
    pub fn remove_subdomain(&self, domain: &str, subdomain: &str) -> Result<(), Error> {
        let call = self.call("removeSubdomain").arg(domain).arg(subdomain);

        self.status_call(&call)
    }

    /// Performs `call` and decodes the response as `kind`.
    ///
    /// A response carrying a non-zero fault code is returned as `Error::Fault`, whatever else it
    /// contains.
    pub fn rpc_call(&self, call: &MethodCall, kind: ResponseKind) -> Result<Response, Error> {
        let body = call.to_xml()?;

        debug!("calling {} at {}", call.name(), self.base_url);
        let body = self.transport.post(&self.base_url, mime::TEXT_XML.as_ref(), body)?;
        debug!("{} returned {} bytes", call.name(), body.len());
        trace!("{} response: {}", call.name(), String::from_utf8_lossy(&body));

        match Response::parse(&body, kind)? {
            Response::Fault(fault) => Err(Error::Fault(fault)),
            response => Ok(response),
        }
    }

    /// Starts a call to `method`, passing the credentials as the first two parameters.
    fn call(&self, method: &str) -> MethodCall {
        MethodCall::new(method)
            .arg(self.api_user.as_str())
            .arg(self.api_password.as_str())
    }

    /// Performs a call whose result is a status string and interprets it.
    fn status_call(&self, call: &MethodCall) -> Result<(), Error> {
        let status = match self.rpc_call(call, ResponseKind::Status)? {
            Response::Status(status) => status,
            other => return Err(mismatch("status string", &other)),
        };

        match status.trim() {
            STATUS_OK => Ok(()),
            STATUS_AUTH_ERROR => Err(Error::Auth),
            other => Err(Error::Unknown(other.to_string())),
        }
    }
}

fn mismatch(expected: &'static str, found: &Response) -> Error {
    let found = match *found {
        Response::Status(_) => "status string",
        Response::Records(_) => "record list",
        Response::Fault(_) => "fault",
    };
    Error::Unmarshal(ParseError::UnexpectedValue {
        expected,
        found: found.to_string(),
    })
}

impl<T: fmt::Debug> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_user", &self.api_user)
            .field("api_password", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::Fault;

    use xml::reader::{EventReader, XmlEvent};

    use std::sync::Mutex;
    use std::thread;

    /// Answers every call with the same status code and body, recording the requests.
    #[derive(Debug)]
    struct Canned {
        status: u16,
        body: String,
        requests: Mutex<Vec<Vec<u8>>>,
    }

    impl Canned {
        fn new(body: &str) -> Self {
            Canned {
                status: 200,
                body: body.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn status(status: u16) -> Self {
            Canned { status, ..Canned::new("") }
        }

        /// Text content of every element of the `n`th request, in document order.
        fn request_texts(&self, n: usize) -> Vec<String> {
            let requests = self.requests.lock().unwrap();
            let texts = EventReader::new(&requests[n][..])
                .into_iter()
                .filter_map(|event| match event.unwrap() {
                    XmlEvent::Characters(text) => Some(text),
                    _ => None,
                })
                .collect();
            texts
        }
    }

    impl Transport for Canned {
        fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            assert_eq!(url, "http://loopia.test/RPCSERV");
            assert_eq!(content_type, "text/xml");
            self.requests.lock().unwrap().push(body);

            if self.status != 200 {
                return Err(TransportError::Status(self.status));
            }
            Ok(self.body.clone().into_bytes())
        }
    }

    fn client(transport: Canned) -> Client<Canned> {
        Client::with_transport("user@loopiaapi", "hunter2", transport).with_base_url("http://loopia.test/RPCSERV")
    }

    fn string_response(status: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<methodResponse><params><param><value><string>{}</string></value></param></params></methodResponse>",
            status
        )
    }

    fn fault_response(code: i32, string: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<methodResponse><fault><value><struct>\
             <member><name>faultCode</name><value><int>{}</int></value></member>\
             <member><name>faultString</name><value><string>{}</string></value></member>\
             </struct></value></fault></methodResponse>",
            code, string
        )
    }

    fn records_response(records: &[(i32, &str)]) -> String {
        let values: String = records
            .iter()
            .map(|&(id, rdata)| {
                format!(
                    "<value><struct>\
                     <member><name>type</name><value><string>TXT</string></value></member>\
                     <member><name>ttl</name><value><int>300</int></value></member>\
                     <member><name>priority</name><value><int>0</int></value></member>\
                     <member><name>rdata</name><value><string>{}</string></value></member>\
                     <member><name>record_id</name><value><int>{}</int></value></member>\
                     </struct></value>",
                    rdata, id
                )
            })
            .collect();
        format!(
            "<?xml version=\"1.0\"?>\n<methodResponse><params><param><value><array><data>{}</data></array></value></param></params></methodResponse>",
            values
        )
    }

    /// Runs each status-string operation against `client`.
    fn status_operations(client: &Client<Canned>) -> Vec<Result<(), Error>> {
        vec![
            client.add_txt_record("example.com", "_acme-challenge", 300, "token"),
            client.remove_txt_record("example.com", "_acme-challenge", 12),
            client.remove_subdomain("example.com", "_acme-challenge"),
        ]
    }

    #[test]
    fn add_txt_record_sends_record_struct() {
        let client = client(Canned::new(&string_response("OK")));

        client.add_txt_record("example.com", "_acme-challenge", 300, "token").unwrap();

        assert_eq!(
            client.transport().request_texts(0),
            [
                "addZoneRecord", "user@loopiaapi", "hunter2", "example.com", "_acme-challenge",
                "type", "TXT", "ttl", "300", "priority", "0", "rdata", "token", "record_id", "0",
            ]
        );
    }

    #[test]
    fn remove_operations_send_positional_params() {
        let client = client(Canned::new(&string_response("OK")));

        client.remove_txt_record("example.com", "www", 12).unwrap();
        client.remove_subdomain("example.com", "www").unwrap();

        assert_eq!(
            client.transport().request_texts(0),
            ["removeZoneRecord", "user@loopiaapi", "hunter2", "example.com", "www", "12"]
        );
        assert_eq!(
            client.transport().request_texts(1),
            ["removeSubdomain", "user@loopiaapi", "hunter2", "example.com", "www"]
        );
    }

    #[test]
    fn ok_status_is_trimmed() {
        let client = client(Canned::new(&string_response("  OK\n")));

        for result in status_operations(&client) {
            result.unwrap();
        }
    }

    #[test]
    fn auth_error_status() {
        let client = client(Canned::new(&string_response("AUTH_ERROR")));

        for result in status_operations(&client) {
            assert!(result.unwrap_err().is_auth());
        }
    }

    #[test]
    fn unknown_status_is_reported_verbatim() {
        let client = client(Canned::new(&string_response(" DOMAIN_OCCUPIED ")));

        for result in status_operations(&client) {
            let err = result.unwrap_err();
            assert!(matches!(err, Error::Unknown(ref s) if s == "DOMAIN_OCCUPIED"));
            assert!(err.to_string().contains("DOMAIN_OCCUPIED"));
        }

        let status = r#"Domain "x" taken \ retry"#;
        let client = self::client(Canned::new(&string_response(r#"Domain &quot;x&quot; taken \ retry"#)));

        for result in status_operations(&client) {
            let err = result.unwrap_err();
            assert!(matches!(err, Error::Unknown(ref s) if s == status));
            assert!(err.to_string().contains(status), "{}", err);
        }
    }

    #[test]
    fn fault_takes_precedence() {
        let client = client(Canned::new(&fault_response(401, "  AUTH_ERROR  ")));
        let expected = Fault::new(401, "AUTH_ERROR");

        for result in status_operations(&client) {
            assert_eq!(result.unwrap_err().fault(), Some(&expected));
        }
        assert_eq!(client.get_txt_records("example.com", "www").unwrap_err().fault(), Some(&expected));
    }

    #[test]
    fn get_txt_records_preserves_order() {
        let client = client(Canned::new(&records_response(&[(9, "first"), (2, "second"), (5, "third")])));

        let records = client.get_txt_records("example.com", "_acme-challenge").unwrap();

        let ids: Vec<i32> = records.iter().map(|r| r.record_id).collect();
        let data: Vec<&str> = records.iter().map(|r| &*r.rdata).collect();
        assert_eq!(ids, [9, 2, 5]);
        assert_eq!(data, ["first", "second", "third"]);
        assert!(records.iter().all(|r| r.kind == "TXT" && r.ttl == 300 && r.priority == 0));
        assert_eq!(
            client.transport().request_texts(0),
            ["getZoneRecords", "user@loopiaapi", "hunter2", "example.com", "_acme-challenge"]
        );
    }

    #[test]
    fn get_txt_records_may_be_empty() {
        let client = client(Canned::new(&records_response(&[])));

        assert!(client.get_txt_records("example.com", "www").unwrap().is_empty());
    }

    #[test]
    fn get_txt_records_rejects_status_strings() {
        let client = client(Canned::new(&string_response("AUTH_ERROR")));

        let err = client.get_txt_records("example.com", "www").unwrap_err();
        assert!(matches!(err, Error::Unmarshal(_)));
        assert!(err.to_string().contains("AUTH_ERROR"));
    }

    #[test]
    fn transport_errors_are_passed_through() {
        let client = client(Canned::status(500));

        for result in status_operations(&client) {
            assert_eq!(result.unwrap_err().status(), Some(500));
        }
        assert_eq!(client.get_txt_records("example.com", "www").unwrap_err().status(), Some(500));
    }

    #[test]
    fn malformed_body_is_an_unmarshal_error() {
        let client = client(Canned::new("<html>Service Unavailable"));

        for result in status_operations(&client) {
            assert!(matches!(result.unwrap_err(), Error::Unmarshal(_)));
        }
    }

    #[test]
    fn shared_between_threads() {
        let client = client(Canned::new(&string_response("OK")));

        thread::scope(|scope| {
            for i in 0..4 {
                let client = &client;
                scope.spawn(move || client.remove_txt_record("example.com", "www", i).unwrap());
            }
        });

        assert_eq!(client.transport().requests.lock().unwrap().len(), 4);
    }

    #[test]
    fn debug_output_redacts_password() {
        let client = client(Canned::new(""));

        let debug = format!("{:?}", client);
        assert!(debug.contains("user@loopiaapi"));
        assert!(!debug.contains("hunter2"));
    }
}
