//! Who may do what with a shopping list.

use crate::{list::ShoppingList, user::UserId, Operation};

/// The relation between a user and a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner,
    Contributor,
    None,
}

impl Access {
    pub fn classify(list: &ShoppingList, user: &UserId) -> Self {
        if &list.owner == user {
            Access::Owner
        } else if list.contributors.contains(user) {
            Access::Contributor
        } else {
            Access::None
        }
    }

    pub fn can_read(self) -> bool {
        matches!(self, Access::Owner | Access::Contributor)
    }

    /// Rename or delete the list, add or remove contributors.
    pub fn can_manage_list(self) -> bool {
        self == Access::Owner
    }

    /// Add, rename, check or remove items.
    pub fn can_manage_items(self) -> bool {
        matches!(self, Access::Owner | Access::Contributor)
    }

    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.can_read(),
            Capability::ManageList => self.can_manage_list(),
            Capability::ManageItems => self.can_manage_items(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    ManageList,
    ManageItems,
}

impl Capability {
    /// Capability an operation needs on its target list.
    ///
    /// `None` for operations that do not target an existing list.
    pub fn required_by(operation: Operation) -> Option<Capability> {
        use Operation::*;
        match operation {
            GetList => Some(Capability::Read),
            RenameList | DeleteList | AddContributor | RemoveContributor => {
                Some(Capability::ManageList)
            }
            AddItem | RenameItem | MarkItem | RemoveItem => Some(Capability::ManageItems),
            GetLists | CreateList | AddUser | GetToken => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{Item, ItemId, ListId};

    const CAPABILITIES: [Capability; 3] = [
        Capability::Read,
        Capability::ManageList,
        Capability::ManageItems,
    ];

    fn list() -> ShoppingList {
        ShoppingList::new(
            ListId::new_v4(),
            "Trip".to_owned(),
            UserId::new("alice"),
            vec![UserId::new("bob")].into_iter().collect(),
            vec![Item::new(ItemId::new_v4(), "Tent".to_owned(), false)],
        )
    }

    #[test]
    fn classify_test() {
        let list = list();
        assert_eq!(Access::classify(&list, &UserId::new("alice")), Access::Owner);
        assert_eq!(Access::classify(&list, &UserId::new("bob")), Access::Contributor);
        assert_eq!(Access::classify(&list, &UserId::new("carol")), Access::None);
        // compared in canonical form
        assert_eq!(Access::classify(&list, &UserId::new(" bob ")), Access::Contributor);
    }

    #[test]
    fn owner_listed_as_contributor_is_still_owner_test() {
        let mut list = list();
        list.contributors.insert(UserId::new("alice"));
        assert_eq!(Access::classify(&list, &UserId::new("alice")), Access::Owner);
    }

    #[test]
    fn capability_table_test() {
        let expected = [
            (Access::Owner, [true, true, true]),
            (Access::Contributor, [true, false, true]),
            (Access::None, [false, false, false]),
        ];
        for (access, allowed) in &expected {
            for (capability, allowed) in CAPABILITIES.iter().zip(allowed.iter()) {
                assert_eq!(
                    access.allows(*capability),
                    *allowed,
                    "{:?} {:?}",
                    access,
                    capability
                );
            }
        }
        assert!(!Access::Contributor.allows(Capability::ManageList));
    }

    #[test]
    fn owner_is_superset_of_contributor_test() {
        for capability in &CAPABILITIES {
            if Access::Contributor.allows(*capability) {
                assert!(Access::Owner.allows(*capability));
            }
        }
    }

    #[test]
    fn required_by_test() {
        assert_eq!(Capability::required_by(Operation::GetList), Some(Capability::Read));
        assert_eq!(
            Capability::required_by(Operation::AddContributor),
            Some(Capability::ManageList)
        );
        assert_eq!(
            Capability::required_by(Operation::MarkItem),
            Some(Capability::ManageItems)
        );
        assert_eq!(Capability::required_by(Operation::CreateList), None);
    }
}
