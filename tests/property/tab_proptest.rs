//! Property-based tests for the chat list tabs

use proptest::prelude::*;

use chatsync::client::ChatTab;
use chatsync::shared::messaging::Conversation;

use crate::common::conversation;

fn conversations() -> impl Strategy<Value = Vec<Conversation>> {
    let role = prop_oneof![Just(""), Just("doctor"), Just("patients"), Just("admin")];
    prop::collection::vec((0u64..1000, role), 0..30).prop_map(|rows| {
        rows.into_iter()
            .map(|(id, role)| conversation(id, &format!("user{}", id), role))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_all_tab_is_identity(list in conversations()) {
        prop_assert_eq!(ChatTab::All.filter(&list), list);
    }

    #[test]
    fn test_role_tabs_keep_server_order(list in conversations()) {
        for tab in [ChatTab::Doctors, ChatTab::Patients] {
            let filtered = tab.filter(&list);
            let expected: Vec<Conversation> =
                list.iter().filter(|c| c.role == tab.role()).cloned().collect();
            prop_assert_eq!(filtered, expected);
        }
    }

    #[test]
    fn test_role_tabs_are_disjoint(list in conversations()) {
        let doctors = ChatTab::Doctors.filter(&list).len();
        let patients = ChatTab::Patients.filter(&list).len();
        prop_assert!(doctors + patients <= list.len());
    }
}
