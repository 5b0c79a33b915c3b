//! Sidebar menu shown around every protected view.

use super::role::Role;

/// One sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    /// Label shown to the user.
    pub label: &'static str,
    /// Navigation target.
    pub path: &'static str,
}

const fn item(label: &'static str, path: &'static str) -> MenuItem {
    MenuItem { label, path }
}

/// Sidebar entries visible to `role`, in display order.
///
/// # Examples
/// ```
/// use frontend::domain::Role;
/// use frontend::domain::navigation::menu_for;
///
/// let labels: Vec<_> = menu_for(Role::Patient).iter().map(|i| i.label).collect();
/// assert_eq!(labels, ["Dashboard", "Profile", "Appointments", "Book Appointment"]);
/// ```
#[must_use]
pub fn menu_for(role: Role) -> Vec<MenuItem> {
    let mut items = vec![item("Dashboard", role.home_path()), item("Profile", "/profile")];
    match role {
        Role::Admin => {
            items.push(item("Departments", "/admin/departments"));
            items.push(item("Users", "/admin/users"));
            items.push(item("Drug Information", "/drugs"));
        }
        Role::Doctor => {
            items.push(item("Appointments", "/appointments"));
            items.push(item("Availability", "/doctor/availability"));
            items.push(item("Medical Records", "/doctor/medical-records"));
            items.push(item("Drug Information", "/drugs"));
        }
        Role::Patient => {
            items.push(item("Appointments", "/appointments"));
            items.push(item("Book Appointment", "/patient/book-appointment"));
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;
    use crate::domain::routing::{Guard, Navigation};
    use rstest::rstest;

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::Doctor)]
    #[case(Role::Patient)]
    fn every_item_renders_for_its_role(#[case] role: Role) {
        let guard = Guard::default();
        let identity = Identity::try_from_parts("7", "menu", role).expect("identity");
        for entry in menu_for(role) {
            assert!(
                matches!(guard.navigate_as(entry.path, Some(&identity)), Navigation::Render(_)),
                "{} ({}) should render for {role}",
                entry.label,
                entry.path
            );
        }
    }

    #[rstest]
    fn patients_do_not_see_drug_information() {
        assert!(
            menu_for(Role::Patient)
                .iter()
                .all(|entry| entry.path != "/drugs")
        );
    }
}
