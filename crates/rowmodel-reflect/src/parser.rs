//! Parser of property declaration lines.
//!
//! ```text
//! @property[-read] <type> $<name> [m:flag[(arguments)]]...
//!
//! type:  ?Base | Base | Base[] | Base|null | Base[]|null
//! Base:  int, integer, float, double, string, bool, boolean, array, or a type reference
//!
//! m:hasOne(column:targetTable)
//! m:hasMany(sourceColumn:associationTable:targetColumn:targetTable)
//! m:belongsToOne(column:targetTable)
//! m:belongsToMany(column:targetTable)
//! m:useMethods(getter|setter)
//! m:enum(Type::PREFIX_*)
//! ```
//!
//! Relationship arguments may be left out or empty; defaults come from the
//! [`NamingConvention`].

use rowmodel_core::{Error, NamingConvention, Result, ScalarType, TypeName};

use crate::definition::Aliases;
use crate::enumeration::{ConstantSource, EnumeratedValues};
use crate::grammar;
use crate::methods::PropertyAccessMethods;
use crate::property::{PropertyDescriptor, PropertyKind, PropertyType};
use crate::relationship::RelationshipDescriptor;

/// Everything a declaration line is interpreted against.
pub(crate) struct DeclarationContext<'a> {
    /// Type whose descriptor is being built.
    pub type_name: &'a TypeName,
    /// Table of that type; the source side of relationship defaults.
    pub table: &'a str,
    /// Aliases of the type that declares the line.
    pub aliases: &'a Aliases,
    pub convention: &'a dyn NamingConvention,
    pub constants: &'a dyn ConstantSource,
}

struct DeclaredType<'a> {
    base: &'a str,
    collection: bool,
    nullable: bool,
}

fn parse_type(expr: &str) -> std::result::Result<DeclaredType<'_>, String> {
    let (expr, mut nullable) = match expr.strip_prefix('?') {
        Some(rest) => (rest, true),
        None => (expr, false),
    };
    let mut base = None;
    for part in expr.split('|') {
        if part.eq_ignore_ascii_case("null") {
            nullable = true;
        } else if part.is_empty() {
            return Err(format!("empty alternative in type '{expr}'"));
        } else if base.replace(part).is_some() {
            return Err(format!("type '{expr}' declares more than one non-null type"));
        }
    }
    let base = base.ok_or_else(|| format!("type '{expr}' declares no non-null type"))?;
    Ok(match base.strip_suffix("[]") {
        Some(element) => DeclaredType {
            base: element,
            collection: true,
            nullable,
        },
        None => DeclaredType {
            base,
            collection: false,
            nullable,
        },
    })
}

/// Parse one declaration line.
pub(crate) fn parse_declaration(
    line: &str,
    ctx: &DeclarationContext<'_>,
) -> Result<PropertyDescriptor> {
    let Some(caps) = grammar::property_head().captures(line) else {
        return Err(Error::schema(
            ctx.type_name.as_str(),
            format!("cannot parse property declaration '{}'", line.trim()),
        ));
    };
    let writable = caps.get(1).is_none();
    let type_expr = caps.get(2).map_or("", |m| m.as_str());
    let name = caps.get(3).map_or("", |m| m.as_str()).to_string();
    let flags = caps.get(4).map_or("", |m| m.as_str());
    let fail = |message: String| Error::schema_property(ctx.type_name.as_str(), &name, message);

    let declared = parse_type(type_expr).map_err(fail)?;
    let (kind, property_type) = match ScalarType::from_keyword(declared.base) {
        Some(_) if declared.collection => {
            return Err(fail(format!(
                "collection '{type_expr}' must contain entities, use 'array' for scalar sequences"
            )));
        }
        Some(scalar) => (PropertyKind::Scalar, PropertyType::Scalar(scalar)),
        None if !grammar::type_reference().is_match(declared.base) => {
            return Err(fail(format!("malformed type reference '{}'", declared.base)));
        }
        None => {
            let target = ctx.aliases.translate(declared.base);
            let kind = if declared.collection {
                PropertyKind::Collection
            } else {
                PropertyKind::Entity
            };
            (kind, PropertyType::Entity(target))
        }
    };

    let mut relationship: Option<RelationshipDescriptor> = None;
    let mut access_methods = None;
    let mut enumerated_values = None;
    let mut consumed = 0;

    for caps in grammar::flag().captures_iter(flags) {
        let Some(whole) = caps.get(0) else { continue };
        check_gap(&flags[consumed..whole.start()]).map_err(fail)?;
        consumed = whole.end();

        let flag = caps.get(1).map_or("", |m| m.as_str());
        let arguments = caps.get(2).map(|m| m.as_str());
        match flag {
            "hasOne" | "hasMany" | "belongsToOne" | "belongsToMany" => {
                if relationship.is_some() {
                    return Err(fail("more than one relationship declared".to_string()));
                }
                let PropertyType::Entity(target) = &property_type else {
                    return Err(fail(format!(
                        "m:{flag} requires an entity type, scalar '{type_expr}' given"
                    )));
                };
                relationship = Some(
                    build_relationship(flag, arguments, target, ctx)
                        .map_err(fail)?,
                );
            }
            "useMethods" => {
                if access_methods.is_some() {
                    return Err(fail("m:useMethods declared twice".to_string()));
                }
                access_methods = Some(
                    PropertyAccessMethods::parse(&name, writable, arguments)
                        .map_err(|e| e.in_schema(ctx.type_name.as_str(), &name))?,
                );
            }
            "enum" => {
                if enumerated_values.is_some() {
                    return Err(fail("m:enum declared twice".to_string()));
                }
                let Some(definition) = arguments else {
                    return Err(fail("m:enum requires a definition".to_string()));
                };
                enumerated_values = Some(
                    EnumeratedValues::parse(definition, ctx.constants)
                        .map_err(|e| e.in_schema(ctx.type_name.as_str(), &name))?,
                );
            }
            other => return Err(fail(format!("unknown flag 'm:{other}'"))),
        }
    }
    check_gap(&flags[consumed..]).map_err(fail)?;

    if let Some(rel) = &relationship {
        match kind {
            PropertyKind::Entity if rel.is_many() => {
                return Err(fail(format!(
                    "m:{} yields a collection but '{type_expr}' is a single entity",
                    rel.flag()
                )));
            }
            PropertyKind::Collection if !rel.is_many() => {
                return Err(fail(format!(
                    "m:{} yields a single entity but '{type_expr}' is a collection",
                    rel.flag()
                )));
            }
            _ => {}
        }
    }
    if enumerated_values.is_some() && kind != PropertyKind::Scalar {
        return Err(fail("m:enum is only allowed on scalar properties".to_string()));
    }

    Ok(PropertyDescriptor {
        column: ctx.convention.column(ctx.type_name, &name),
        name,
        kind,
        property_type,
        nullable: declared.nullable,
        writable,
        relationship,
        access_methods,
        enumerated_values,
    })
}

fn check_gap(text: &str) -> std::result::Result<(), String> {
    if text.trim().is_empty() {
        Ok(())
    } else {
        Err(format!("unexpected text '{}' in flags", text.trim()))
    }
}

fn split_arguments(
    flag: &str,
    arguments: Option<&str>,
    max: usize,
) -> std::result::Result<Vec<Option<String>>, String> {
    let mut parts: Vec<Option<String>> = match arguments {
        Some(arguments) if !arguments.trim().is_empty() => arguments
            .split(':')
            .map(str::trim)
            .map(|part| (!part.is_empty()).then(|| part.to_string()))
            .collect(),
        _ => Vec::new(),
    };
    if parts.len() > max {
        return Err(format!(
            "m:{flag} takes at most {max} arguments, {} given",
            parts.len()
        ));
    }
    if let Some(bad) = parts
        .iter()
        .flatten()
        .find(|part| !grammar::identifier().is_match(part))
    {
        return Err(format!("malformed name '{bad}' in m:{flag}"));
    }
    parts.resize(max, None);
    Ok(parts)
}

fn build_relationship(
    flag: &str,
    arguments: Option<&str>,
    target: &TypeName,
    ctx: &DeclarationContext<'_>,
) -> std::result::Result<RelationshipDescriptor, String> {
    let convention = ctx.convention;
    let source_table = ctx.table;

    if flag == "hasMany" {
        let mut parts = split_arguments(flag, arguments, 4)?.into_iter();
        let (source_column, association_table, target_column, target_table) = (
            parts.next().flatten(),
            parts.next().flatten(),
            parts.next().flatten(),
            parts.next().flatten(),
        );
        let target_table = target_table.unwrap_or_else(|| convention.table_for_type(target));
        let association_table = association_table
            .unwrap_or_else(|| convention.relationship_table(source_table, &target_table));
        let source_column = source_column
            .unwrap_or_else(|| convention.relationship_column(&association_table, source_table));
        let target_column = target_column
            .unwrap_or_else(|| convention.relationship_column(&association_table, &target_table));
        return Ok(RelationshipDescriptor::ManyOwning {
            source_column,
            association_table,
            target_column,
            target_table,
        });
    }

    let mut parts = split_arguments(flag, arguments, 2)?.into_iter();
    let (column, target_table) = (parts.next().flatten(), parts.next().flatten());
    let target_table = target_table.unwrap_or_else(|| convention.table_for_type(target));
    Ok(match flag {
        "hasOne" => RelationshipDescriptor::SingleOwned {
            column: column
                .unwrap_or_else(|| convention.relationship_column(source_table, &target_table)),
            target_table,
        },
        "belongsToOne" => RelationshipDescriptor::SingleOwning {
            column: column
                .unwrap_or_else(|| convention.relationship_column(&target_table, source_table)),
            target_table,
        },
        _ => RelationshipDescriptor::ManyOwned {
            column: column
                .unwrap_or_else(|| convention.relationship_column(&target_table, source_table)),
            target_table,
        },
    })
}
