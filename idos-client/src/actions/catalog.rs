//! The action catalog: one definition per public operation, grouped the
//! way the network groups its tables.

use super::ActionDef;
use idos_core::types::DataType;

/// All user-facing actions live in the main deployment's namespace.
pub const NAMESPACE: &str = "idos";

const fn action(name: &'static str, params: &'static [(&'static str, DataType)]) -> ActionDef {
    ActionDef { namespace: NAMESPACE, name, params }
}

pub mod users {
    use super::*;

    /// The caller's own profile.
    pub const GET: ActionDef = action("get_user", &[]);

    /// Whether an address already belongs to a profile.
    pub const HAS_PROFILE: ActionDef =
        action("has_profile", &[("address", DataType::TEXT)]);
}

pub mod wallets {
    use super::*;

    pub const ADD: ActionDef = action(
        "add_wallet",
        &[
            ("id", DataType::UUID),
            ("address", DataType::TEXT),
            ("wallet_type", DataType::TEXT),
            ("message", DataType::TEXT),
            ("signature", DataType::TEXT),
            ("public_key", DataType::TEXT),
        ],
    );

    pub const GET_ALL: ActionDef = action("get_wallets", &[]);

    pub const REMOVE: ActionDef = action("remove_wallet", &[("id", DataType::UUID)]);
}

pub mod credentials {
    use super::*;

    pub const ADD: ActionDef = action(
        "add_credential",
        &[
            ("id", DataType::UUID),
            ("issuer_auth_public_key", DataType::TEXT),
            ("encryptor_public_key", DataType::TEXT),
            ("content", DataType::TEXT),
            ("public_notes", DataType::TEXT),
        ],
    );

    pub const GET_ALL: ActionDef = action("get_credentials", &[]);

    /// Credentials the caller owns directly (no shared copies).
    pub const GET_OWNED: ActionDef = action("get_credentials_owned", &[]);

    /// A single credential shared with the caller through an access grant.
    pub const GET_SHARED: ActionDef =
        action("get_credential_shared", &[("id", DataType::UUID)]);

    pub const EDIT: ActionDef = action(
        "edit_credential",
        &[
            ("id", DataType::UUID),
            ("issuer_auth_public_key", DataType::TEXT),
            ("encryptor_public_key", DataType::TEXT),
            ("content", DataType::TEXT),
            ("public_notes", DataType::TEXT),
        ],
    );

    pub const REMOVE: ActionDef = action("remove_credential", &[("id", DataType::UUID)]);

    /// Inserts a re-encrypted copy of a credential for a grantee.
    pub const SHARE: ActionDef = action(
        "share_credential",
        &[
            ("id", DataType::UUID),
            ("original_credential_id", DataType::UUID),
            ("grantee_wallet_identifier", DataType::TEXT),
            ("locked_until", DataType::INT),
            ("content", DataType::TEXT),
            ("encryptor_public_key", DataType::TEXT),
        ],
    );
}

pub mod access_grants {
    use super::*;

    pub const CREATE: ActionDef = action(
        "create_access_grant",
        &[
            ("data_id", DataType::UUID),
            ("grantee_wallet_identifier", DataType::TEXT),
            ("locked_until", DataType::INT),
            ("content_hash", DataType::TEXT),
        ],
    );

    pub const GET_OWNED: ActionDef = action("get_access_grants_owned", &[]);

    pub const GET_GRANTED: ActionDef = action(
        "get_access_grants_granted",
        &[("page", DataType::INT), ("size", DataType::INT)],
    );

    pub const GET_FOR_CREDENTIAL: ActionDef =
        action("get_access_grants_for_credential", &[("credential_id", DataType::UUID)]);

    pub const REVOKE: ActionDef = action("revoke_access_grant", &[("id", DataType::UUID)]);
}

pub mod attributes {
    use super::*;

    pub const ADD: ActionDef = action(
        "add_attribute",
        &[
            ("id", DataType::UUID),
            ("attribute_key", DataType::TEXT),
            ("value", DataType::TEXT),
        ],
    );

    pub const GET_ALL: ActionDef = action("get_attributes", &[]);

    pub const EDIT: ActionDef = action(
        "edit_attribute",
        &[
            ("id", DataType::UUID),
            ("attribute_key", DataType::TEXT),
            ("value", DataType::TEXT),
        ],
    );

    pub const REMOVE: ActionDef = action("remove_attribute", &[("id", DataType::UUID)]);

    /// Inserts a copy of an attribute visible to a grantee.
    pub const SHARE: ActionDef = action(
        "share_attribute",
        &[
            ("id", DataType::UUID),
            ("original_attribute_id", DataType::UUID),
            ("grantee_wallet_identifier", DataType::TEXT),
        ],
    );
}
