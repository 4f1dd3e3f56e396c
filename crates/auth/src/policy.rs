//! Permission decisions for identity and catalog mutation.
//!
//! Pure functions: no IO, no panics, no business orchestration. Absence of
//! permission is a normal `false`, never an error — callers translate denial
//! into their own forbidden result.
//!
//! The update and delete rules share one table on purpose; the original
//! system kept two slightly divergent copies and they drifted.

use crate::Role;

/// May `actor` create a new identity with role `target`?
///
/// `is_same` — the new record would carry the actor's own username.
///
/// SUPER may create anyone except a duplicate of themself. ADMIN may create
/// a record that is "the same identity" or any READER. READER and GUEST may
/// create no one (self-signup is a separate, unauthenticated flow that pins
/// the role to READER).
pub fn may_create_identity(actor: Role, target: Role, is_same: bool) -> bool {
    match actor {
        Role::Super => !is_same,
        Role::Admin => is_same || target == Role::Reader,
        Role::Reader | Role::Guest => false,
    }
}

/// May `actor` update identity fields of a `target`-role record?
pub fn may_update_identity(actor: Role, target: Role, is_same: bool) -> bool {
    may_modify_identity(actor, target, is_same)
}

/// May `actor` delete a `target`-role record?
pub fn may_delete_identity(actor: Role, target: Role, is_same: bool) -> bool {
    may_modify_identity(actor, target, is_same)
}

/// Shared decision table for update and delete.
///
/// SUPER: anyone but themself. ADMIN: themself or any READER. READER:
/// themself only. GUEST: no one.
fn may_modify_identity(actor: Role, target: Role, is_same: bool) -> bool {
    match actor {
        Role::Super => !is_same,
        Role::Admin => is_same || target == Role::Reader,
        Role::Reader => is_same,
        Role::Guest => false,
    }
}

/// May `actor` create, update or delete catalog books?
///
/// No ownership nuance: SUPER and ADMIN may, nobody else.
pub fn may_mutate_book(actor: Role) -> bool {
    matches!(actor, Role::Super | Role::Admin)
}
