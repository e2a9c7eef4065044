use crate::protocol::{Request, Response};
use crate::store::IdentityStore;

/// One handler per operation. Handlers always produce a response; the
/// connection loop writes it back unchanged.
pub trait RequestHandler {
    fn handle(&mut self, request: &Request, store: &mut dyn IdentityStore) -> Response;
}
