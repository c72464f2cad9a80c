//! Resource authorization rules
//!
//! A pure lookup over (principal kind, action, resource kind, resource
//! scope). Decisions are cheap and evaluated per request; nothing is cached.
//! Any combination not listed below is denied.

use common::PrincipalKind;
use uuid::Uuid;

use crate::middleware::AuthPrincipal;

/// What the principal wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

/// What the principal wants to do it to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Branch,
    Subject,
    Notice,
    Timetable,
    Material,
    /// Account management for a given principal kind (register, list, edit
    /// others, deactivate)
    Account(PrincipalKind),
    /// A principal's own record
    Profile,
    /// A principal's own password
    Password,
}

/// The scope a resource record belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceScope {
    /// Not tied to any principal or branch
    Global,
    /// Owned by a single principal
    Principal(Uuid),
    /// Tied to a semester within a branch
    SemesterBranch { semester: i16, branch_id: Uuid },
    /// Tied to a branch
    Branch(Uuid),
    /// Notice audience flags
    Audience { student: bool, faculty: bool },
}

/// Whether the principal's own semester/branch covers the given scope.
/// Students must match both; faculty are not bound to a semester and match
/// on branch alone. Admins see everything.
fn scope_matches(principal: &AuthPrincipal, scope: &ResourceScope) -> bool {
    match principal.kind {
        PrincipalKind::Admin => true,
        PrincipalKind::Student => match scope {
            ResourceScope::SemesterBranch {
                semester,
                branch_id,
            } => {
                principal.semester == Some(*semester) && principal.branch_id == Some(*branch_id)
            }
            ResourceScope::Branch(branch_id) => principal.branch_id == Some(*branch_id),
            _ => false,
        },
        PrincipalKind::Faculty => match scope {
            ResourceScope::SemesterBranch { branch_id, .. } | ResourceScope::Branch(branch_id) => {
                principal.branch_id == Some(*branch_id)
            }
            _ => false,
        },
    }
}

/// The policy table. Returns true only for combinations it knows about;
/// everything else is denied.
pub fn is_allowed(
    principal: &AuthPrincipal,
    action: Action,
    resource: ResourceKind,
    scope: &ResourceScope,
) -> bool {
    use Action::*;
    use PrincipalKind::*;
    use ResourceKind::*;

    match (resource, action) {
        // Branch catalog: managed by admins, readable by anyone authenticated.
        (Branch, Create | Update | Delete) => principal.kind == Admin,
        (Branch, Read) => true,

        // Subjects are managed by admins and read within the caller's
        // semester/branch.
        (Subject, Create | Update | Delete) => principal.kind == Admin,
        (Subject, Read) => scope_matches(principal, scope),

        // Notices are posted by admins; reads are gated on the audience.
        (Notice, Create | Update | Delete) => principal.kind == Admin,
        (Notice, Read) => match scope {
            ResourceScope::Audience { student, faculty } => match principal.kind {
                Admin => true,
                Student => *student,
                Faculty => *faculty,
            },
            _ => principal.kind == Admin,
        },

        // Timetables are uploaded by admins and read within scope.
        (Timetable, Create | Update | Delete) => principal.kind == Admin,
        (Timetable, Read) => scope_matches(principal, scope),

        // Materials are uploaded by faculty for their own branch (or by
        // admins) and read within scope.
        (Material, Create | Update | Delete) => match principal.kind {
            Admin => true,
            Faculty => scope_matches(principal, scope),
            Student => false,
        },
        (Material, Read) => scope_matches(principal, scope),

        // Account management is admin territory for every kind.
        (Account(_), Create | Read | Update | Delete) => principal.kind == Admin,

        // A principal may see and edit their own record regardless of kind;
        // admins may edit anyone's.
        (Profile, Read | Update) => match scope {
            ResourceScope::Principal(owner) => principal.id == *owner || principal.kind == Admin,
            _ => false,
        },

        // Passwords are changed only by their owner.
        (Password, Update) => matches!(scope, ResourceScope::Principal(owner) if principal.id == *owner),

        // Fail closed.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AuthPrincipal {
        AuthPrincipal {
            id: Uuid::new_v4(),
            kind: PrincipalKind::Admin,
            semester: None,
            branch_id: None,
        }
    }

    fn student(semester: i16, branch_id: Uuid) -> AuthPrincipal {
        AuthPrincipal {
            id: Uuid::new_v4(),
            kind: PrincipalKind::Student,
            semester: Some(semester),
            branch_id: Some(branch_id),
        }
    }

    fn faculty(branch_id: Uuid) -> AuthPrincipal {
        AuthPrincipal {
            id: Uuid::new_v4(),
            kind: PrincipalKind::Faculty,
            semester: None,
            branch_id: Some(branch_id),
        }
    }

    #[test]
    fn test_branch_creation_is_admin_only() {
        let branch = Uuid::new_v4();
        assert!(is_allowed(
            &admin(),
            Action::Create,
            ResourceKind::Branch,
            &ResourceScope::Global
        ));
        assert!(!is_allowed(
            &student(3, branch),
            Action::Create,
            ResourceKind::Branch,
            &ResourceScope::Global
        ));
        assert!(!is_allowed(
            &faculty(branch),
            Action::Create,
            ResourceKind::Branch,
            &ResourceScope::Global
        ));
    }

    #[test]
    fn test_material_read_requires_matching_scope() {
        let branch = Uuid::new_v4();
        let other_branch = Uuid::new_v4();
        let own = ResourceScope::SemesterBranch {
            semester: 3,
            branch_id: branch,
        };
        let other_semester = ResourceScope::SemesterBranch {
            semester: 4,
            branch_id: branch,
        };
        let elsewhere = ResourceScope::SemesterBranch {
            semester: 3,
            branch_id: other_branch,
        };

        let s = student(3, branch);
        assert!(is_allowed(&s, Action::Read, ResourceKind::Material, &own));
        assert!(!is_allowed(&s, Action::Read, ResourceKind::Material, &other_semester));
        assert!(!is_allowed(&s, Action::Read, ResourceKind::Material, &elsewhere));

        // Faculty match on branch alone.
        let f = faculty(branch);
        assert!(is_allowed(&f, Action::Read, ResourceKind::Material, &own));
        assert!(is_allowed(&f, Action::Read, ResourceKind::Material, &other_semester));
        assert!(!is_allowed(&f, Action::Read, ResourceKind::Material, &elsewhere));

        // Admins read everything.
        assert!(is_allowed(&admin(), Action::Read, ResourceKind::Material, &elsewhere));
    }

    #[test]
    fn test_material_upload_by_faculty_in_own_branch_only() {
        let branch = Uuid::new_v4();
        let other_branch = Uuid::new_v4();

        let f = faculty(branch);
        assert!(is_allowed(
            &f,
            Action::Create,
            ResourceKind::Material,
            &ResourceScope::Branch(branch)
        ));
        assert!(!is_allowed(
            &f,
            Action::Create,
            ResourceKind::Material,
            &ResourceScope::Branch(other_branch)
        ));
        assert!(!is_allowed(
            &student(3, branch),
            Action::Create,
            ResourceKind::Material,
            &ResourceScope::Branch(branch)
        ));
    }

    #[test]
    fn test_notice_read_gated_on_audience() {
        let branch = Uuid::new_v4();
        let student_only = ResourceScope::Audience {
            student: true,
            faculty: false,
        };
        let faculty_only = ResourceScope::Audience {
            student: false,
            faculty: true,
        };

        let s = student(1, branch);
        let f = faculty(branch);
        assert!(is_allowed(&s, Action::Read, ResourceKind::Notice, &student_only));
        assert!(!is_allowed(&s, Action::Read, ResourceKind::Notice, &faculty_only));
        assert!(is_allowed(&f, Action::Read, ResourceKind::Notice, &faculty_only));
        assert!(!is_allowed(&f, Action::Read, ResourceKind::Notice, &student_only));
        assert!(is_allowed(&admin(), Action::Read, ResourceKind::Notice, &student_only));
    }

    #[test]
    fn test_own_profile_and_password() {
        let branch = Uuid::new_v4();
        let s = student(2, branch);
        let own = ResourceScope::Principal(s.id);
        let someone_else = ResourceScope::Principal(Uuid::new_v4());

        assert!(is_allowed(&s, Action::Read, ResourceKind::Profile, &own));
        assert!(is_allowed(&s, Action::Update, ResourceKind::Profile, &own));
        assert!(!is_allowed(&s, Action::Read, ResourceKind::Profile, &someone_else));

        assert!(is_allowed(&s, Action::Update, ResourceKind::Password, &own));
        assert!(!is_allowed(&s, Action::Update, ResourceKind::Password, &someone_else));

        // Admins may edit anyone's profile, but not change their password.
        assert!(is_allowed(&admin(), Action::Update, ResourceKind::Profile, &someone_else));
        assert!(!is_allowed(&admin(), Action::Update, ResourceKind::Password, &someone_else));
    }

    #[test]
    fn test_account_management_is_admin_only() {
        let branch = Uuid::new_v4();
        for kind in [
            PrincipalKind::Admin,
            PrincipalKind::Faculty,
            PrincipalKind::Student,
        ] {
            assert!(is_allowed(
                &admin(),
                Action::Create,
                ResourceKind::Account(kind),
                &ResourceScope::Global
            ));
            assert!(!is_allowed(
                &faculty(branch),
                Action::Create,
                ResourceKind::Account(kind),
                &ResourceScope::Global
            ));
            assert!(!is_allowed(
                &student(1, branch),
                Action::Read,
                ResourceKind::Account(kind),
                &ResourceScope::Global
            ));
        }
    }

    #[test]
    fn test_fails_closed_on_unmatched_combinations() {
        let branch = Uuid::new_v4();
        let s = student(1, branch);

        // Deletion of a password is not a thing the table knows.
        assert!(!is_allowed(
            &s,
            Action::Delete,
            ResourceKind::Password,
            &ResourceScope::Principal(s.id)
        ));
        // Profile with a non-principal scope.
        assert!(!is_allowed(
            &s,
            Action::Read,
            ResourceKind::Profile,
            &ResourceScope::Global
        ));
        // Scoped read against a scope kind that carries no semester/branch.
        assert!(!is_allowed(
            &s,
            Action::Read,
            ResourceKind::Material,
            &ResourceScope::Global
        ));
    }
}
