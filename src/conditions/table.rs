/// How a v4 condition rule turns into v5 condition objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuleKind {
    /// `true` yields `{ <type_key> = {} }`.
    Flag { type_key: &'static str },
    /// One object per list element: `{ <type_key> = { <nested_key> = v } }`.
    List {
        type_key: &'static str,
        nested_key: &'static str,
    },
    /// One object keyed by the rule name on both levels.
    Scalar { type_key: &'static str },
    /// An identity-provider block whose list field is folded into a scalar.
    Provider {
        type_key: &'static str,
        list_field: &'static str,
        nested_field: &'static str,
        fold: ProviderFold,
    },
    /// Carried unchanged under the same key.
    Passthrough { type_key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProviderFold {
    /// Only the first list value survives.
    FirstValue,
    /// One object per list value, metadata duplicated.
    EachValue,
}

/// Defines the rule catalogue: the lookup from v4 rule name to [`RuleKind`]
/// and the set of type keys a v5 condition object may use.
macro_rules! define_condition_catalogue {
    (
        flags { $( $flag:literal ),* $(,)? }
        lists { $( $list:literal => ($list_type:literal, $list_nested:literal) ),* $(,)? }
        scalars { $( $scalar:literal ),* $(,)? }
        providers { $( $provider:literal => ($provider_type:literal, $list_field:literal => $nested_field:literal, $fold:ident) ),* $(,)? }
        passthrough { $( $pass:literal ),* $(,)? }
    ) => {
        pub(crate) fn lookup(name: &str) -> Option<RuleKind> {
            match name {
                $( $flag => Some(RuleKind::Flag { type_key: $flag }), )*
                $( $list => Some(RuleKind::List { type_key: $list_type, nested_key: $list_nested }), )*
                $( $scalar => Some(RuleKind::Scalar { type_key: $scalar }), )*
                $( $provider => Some(RuleKind::Provider {
                    type_key: $provider_type,
                    list_field: $list_field,
                    nested_field: $nested_field,
                    fold: ProviderFold::$fold,
                }), )*
                $( $pass => Some(RuleKind::Passthrough { type_key: $pass }), )*
                _ => None,
            }
        }

        const V5_TYPE_KEYS: &[&str] = &[
            $( $flag, )*
            $( $list_type, )*
            $( $scalar, )*
            $( $provider_type, )*
            $( $pass, )*
        ];
    };
}

define_condition_catalogue! {
    flags { "everyone", "certificate", "any_valid_service_token" }
    lists {
        "email" => ("email", "email"),
        "email_domain" => ("email_domain", "domain"),
        "email_list" => ("email_list", "id"),
        "ip" => ("ip", "ip"),
        "ip_list" => ("ip_list", "id"),
        "service_token" => ("service_token", "token_id"),
        "group" => ("group", "id"),
        "geo" => ("geo", "country_code"),
        "login_method" => ("login_method", "id"),
        "device_posture" => ("device_posture", "integration_uid"),
        "common_names" => ("common_name", "common_name"),
    }
    scalars { "common_name", "auth_method" }
    providers {
        "azure" => ("azure_ad", "id" => "id", FirstValue),
        "github" => ("github_organization", "teams" => "team", EachValue),
        "gsuite" => ("gsuite", "email" => "email", EachValue),
        "okta" => ("okta", "name" => "name", EachValue),
    }
    passthrough { "saml", "external_evaluation", "auth_context" }
}

pub(crate) fn is_v5_type_key(key: &str) -> bool {
    V5_TYPE_KEYS.contains(&key)
}

