//! Authorizer capability
//!
//! An [`Authorizer`] decides whether a JSON:API operation may run. The
//! framework only defines the capability and the request shape; generated
//! scaffolds (see [`crate::generator`]) implement it and applications fill
//! in the policy.

/// The operation being authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    /// Resource type the operation targets
    pub resource_type: String,

    /// Resource id, absent for collection operations
    pub resource_id: Option<String>,

    /// Relationship name for relationship operations
    pub relationship: Option<String>,
}

impl AuthRequest {
    /// A collection-level request (`index`, `store`)
    pub fn collection(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: None,
            relationship: None,
        }
    }

    /// A request on a single resource
    pub fn resource(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: Some(id.into()),
            relationship: None,
        }
    }

    /// A request on one relationship of a resource
    pub fn relationship(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: Some(id.into()),
            relationship: Some(relationship.into()),
        }
    }
}

/// Capability deciding whether operations on a resource are permitted
///
/// Every method returns `true` when the operation may proceed.
pub trait Authorizer: Send + Sync {
    /// Fetch many resources
    fn index(&self, request: &AuthRequest) -> bool;

    /// Create a resource
    fn store(&self, request: &AuthRequest) -> bool;

    /// Fetch one resource
    fn show(&self, request: &AuthRequest) -> bool;

    /// Update a resource
    fn update(&self, request: &AuthRequest) -> bool;

    /// Delete a resource
    fn destroy(&self, request: &AuthRequest) -> bool;

    /// Fetch the related resources of a relationship
    fn show_related(&self, request: &AuthRequest) -> bool;

    /// Fetch the identifiers of a relationship
    fn show_relationship(&self, request: &AuthRequest) -> bool;

    /// Replace the members of a relationship
    fn update_relationship(&self, request: &AuthRequest) -> bool;

    /// Add members to a to-many relationship
    fn attach_relationship(&self, request: &AuthRequest) -> bool;

    /// Remove members from a to-many relationship
    fn detach_relationship(&self, request: &AuthRequest) -> bool;
}

/// Names of the [`Authorizer`] methods, in declaration order
pub const AUTHORIZER_METHODS: [&str; 10] = [
    "index",
    "store",
    "show",
    "update",
    "destroy",
    "show_related",
    "show_relationship",
    "update_relationship",
    "attach_relationship",
    "detach_relationship",
];

/// Authorizer that permits everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_constructors() {
        let request = AuthRequest::relationship("posts", "1", "tags");
        assert_eq!(request.resource_type, "posts");
        assert_eq!(request.resource_id.as_deref(), Some("1"));
        assert_eq!(request.relationship.as_deref(), Some("tags"));

        let request = AuthRequest::collection("posts");
        assert!(request.resource_id.is_none());
        assert!(request.relationship.is_none());
    }

    #[test]
    fn test_method_names_follow_trait() {
        let operations: [(&str, fn(&dyn Authorizer, &AuthRequest) -> bool); 10] = [
            ("index", |a, r| a.index(r)),
            ("store", |a, r| a.store(r)),
            ("show", |a, r| a.show(r)),
            ("update", |a, r| a.update(r)),
            ("destroy", |a, r| a.destroy(r)),
            ("show_related", |a, r| a.show_related(r)),
            ("show_relationship", |a, r| a.show_relationship(r)),
            ("update_relationship", |a, r| a.update_relationship(r)),
            ("attach_relationship", |a, r| a.attach_relationship(r)),
            ("detach_relationship", |a, r| a.detach_relationship(r)),
        ];

        let names: Vec<&str> = operations.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, AUTHORIZER_METHODS);

        let request = AuthRequest::collection("posts");
        for (name, operation) in operations {
            assert!(operation(&AllowAll, &request), "{} refused", name);
        }
    }

    #[test]
    fn test_allow_all() {
        let authorizer: &dyn Authorizer = &AllowAll;
        let request = AuthRequest::resource("posts", "1");
        assert!(authorizer.show(&request));
        assert!(authorizer.destroy(&request));
        assert!(authorizer.show_relationship(&request));
    }
}
