//! HTTP status codes as a typed enum.
//!
//! Only the codes the paste service actually answers with. Use [`Status`]
//! anywhere a status code is accepted: `Response::status()` or
//! `Response::builder().status()`.

/// The status codes the service emits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                  // 200
    Found,               // 302
    BadRequest,          // 400
    Forbidden,           // 403
    NotFound,            // 404
    MethodNotAllowed,    // 405
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::Found               => 302,
            Status::BadRequest          => 400,
            Status::Forbidden           => 403,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
        }
    }
}
