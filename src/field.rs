// Field-level metadata and the alias-aware name matching rule.

/// The declarative-annotation key the engine reads field aliases from. The
/// original engine drifted between two spellings across its two variants;
/// this reimplementation compiles in exactly one.
pub const FIELD_ALIAS_ATTR: &str = "pb";

/// Per-field metadata a `reflect_record!`-generated type exposes for both
/// the source and destination roles.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub exported: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, alias: Option<&'static str>, exported: bool) -> Self {
        Self {
            name,
            alias,
            exported,
        }
    }
}

/// Two field names match iff, after case-folding: the declared names are
/// equal, the source name equals the destination alias, or the destination
/// name equals the source alias.
pub fn names_match(src: &FieldDescriptor, dst: &FieldDescriptor) -> bool {
    if src.name.is_empty() || dst.name.is_empty() {
        return false;
    }
    let src_name = src.name.to_lowercase();
    let dst_name = dst.name.to_lowercase();
    if src_name == dst_name {
        return true;
    }
    if let Some(dst_alias) = dst.alias {
        if src_name == dst_alias.to_lowercase() {
            return true;
        }
    }
    if let Some(src_alias) = src.alias {
        if dst_name == src_alias.to_lowercase() {
            return true;
        }
    }
    false
}
