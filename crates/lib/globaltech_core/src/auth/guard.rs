//! Request-time authorization guard.
//!
//! Requirements are evaluated left to right and the first failure wins.
//! Callers list them in a fixed order: authentication, role, ownership.

use crate::error::{ShopError, ShopResult};
use crate::models::auth::{Role, TokenClaims};

/// One condition a request must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement<'a> {
    /// A verified token is present.
    Authenticated,
    /// The token's role grants at least this role.
    Role(Role),
    /// The token's subject is this user id (product owner, user record).
    Owner(&'a str),
    /// The token's cart is this cart id.
    CartHolder(&'a str),
}

/// Evaluate `requirements` against the decoded token.
///
/// Missing claims fail with `Unauthorized`; role and ownership failures with
/// `Forbidden`. No role overrides an ownership requirement.
pub fn allow<'c>(
    claims: Option<&'c TokenClaims>,
    requirements: &[Requirement<'_>],
) -> ShopResult<&'c TokenClaims> {
    let claims = claims.ok_or_else(|| ShopError::Unauthorized("Not authenticated".into()))?;
    for requirement in requirements {
        match *requirement {
            Requirement::Authenticated => {}
            Requirement::Role(required) => {
                if !grants(claims.role, required) {
                    return Err(ShopError::Forbidden(format!(
                        "Role '{required}' required, current role is '{}'",
                        claims.role
                    )));
                }
            }
            Requirement::Owner(owner_id) => {
                if claims.sub != owner_id {
                    return Err(ShopError::Forbidden(
                        "Only the owner may perform this action".into(),
                    ));
                }
            }
            Requirement::CartHolder(cart_id) => {
                if claims.cart != cart_id {
                    return Err(ShopError::Forbidden("This cart belongs to another user".into()));
                }
            }
        }
    }
    Ok(claims)
}

/// Premium includes everything a user may do.
fn grants(held: Role, required: Role) -> bool {
    match required {
        Role::User => true,
        Role::Premium => held == Role::Premium,
    }
}
