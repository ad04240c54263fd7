use serde::Serialize;

use crate::info::MemberKind;

// -----------------------------------------------------------------------------
// Schema feed

// The engine does not own a schema document format; it feeds an external
// generator the member names, type identities, and descriptions it would
// need to emit one.

/// Metadata feed for one member of a type.
#[derive(Debug, Clone, Serialize)]
pub struct MemberSchema {
    pub name: &'static str,
    /// Canonical type identity of the member.
    pub identity: String,
    pub is_property: bool,
    pub optional: bool,
    pub read_only: bool,
    pub docs: Option<&'static str>,
}

impl MemberSchema {
    pub(crate) fn from_info(info: &crate::info::MemberInfo) -> Self {
        Self {
            name: info.name(),
            identity: info.tag().canonical(),
            is_property: info.kind() == MemberKind::Property,
            optional: info.is_optional(),
            read_only: info.is_read_only(),
            docs: info.docs(),
        }
    }
}

/// Metadata feed for one type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeSchema {
    /// Canonical type identity.
    pub identity: String,
    pub kind: String,
    pub docs: Option<&'static str>,
    pub members: Vec<MemberSchema>,
}

/// Metadata feed for one operation parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSchema {
    pub name: String,
    pub identity: String,
    pub optional: bool,
    pub docs: Option<String>,
}

/// Metadata feed for one operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationSchema {
    pub declaring: String,
    pub name: String,
    pub params: Vec<ParamSchema>,
    pub returns: Option<String>,
    pub is_static: bool,
    pub is_async: bool,
    pub docs: Option<String>,
}

impl OperationSchema {
    pub(crate) fn from_descriptor(descriptor: &crate::invoke::OperationDescriptor) -> Self {
        Self {
            declaring: descriptor.declaring().canonical(),
            name: descriptor.name().to_owned(),
            params: descriptor
                .params()
                .iter()
                .map(|param| ParamSchema {
                    name: param.name().to_owned(),
                    identity: param.tag().canonical(),
                    optional: param.default().is_some(),
                    docs: param.docs().map(str::to_owned),
                })
                .collect(),
            returns: descriptor.returns().map(|tag| tag.canonical()),
            is_static: descriptor.is_static(),
            is_async: descriptor.is_async(),
            docs: descriptor.docs().map(str::to_owned),
        }
    }
}
