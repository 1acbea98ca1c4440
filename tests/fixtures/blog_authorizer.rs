//! BlogAuthorizer: authorizer for any resource.
//!
//! Module: `crate::json_api::authorizers`

use jsonapi::core::auth::{AuthRequest, Authorizer};

#[derive(Debug, Clone, Copy, Default)]
pub struct BlogAuthorizer;

impl Authorizer for BlogAuthorizer {
    fn index(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn store(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn show(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn update(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn destroy(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn show_related(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn show_relationship(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn update_relationship(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn attach_relationship(&self, _request: &AuthRequest) -> bool {
        true
    }

    fn detach_relationship(&self, _request: &AuthRequest) -> bool {
        true
    }
}
