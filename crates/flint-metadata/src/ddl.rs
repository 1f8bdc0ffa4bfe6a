//! DDL text generation
//!
//! Items are polymorphic over {produce-DDL, accept-visitor}: `accept`
//! dispatches on the kind tag to one visitor callback per kind, and
//! `CreateDdlBuilder` is the visitor that renders CREATE (or
//! CREATE OR ALTER) statement text from loaded properties. Callers are
//! expected to have loaded properties (and children for relations)
//! before asking for DDL.

use crate::item::{MetadataItem, Properties};
use crate::kinds::ObjectKind;
use crate::relation;
use crate::trigger;
use crate::user;
use std::sync::Arc;

/// One callback per object kind; default implementations do nothing
pub trait MetadataVisitor {
    fn visit_database(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_schema(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_table(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_view(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_column(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_trigger(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_domain(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_procedure(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_function(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_generator(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_exception(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_index(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_package(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_role(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_user(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_collation(&mut self, _item: &Arc<MetadataItem>) {}
    fn visit_character_set(&mut self, _item: &Arc<MetadataItem>) {}
}

/// Dispatch an item to the visitor callback matching its kind
pub fn accept(item: &Arc<MetadataItem>, visitor: &mut dyn MetadataVisitor) {
    use ObjectKind::*;
    match item.kind() {
        Database => visitor.visit_database(item),
        Schema => visitor.visit_schema(item),
        Table | SystemTable | GlobalTemporaryTable => visitor.visit_table(item),
        View => visitor.visit_view(item),
        Column => visitor.visit_column(item),
        DmlTrigger | DbTrigger | DdlTrigger => visitor.visit_trigger(item),
        Domain | SystemDomain => visitor.visit_domain(item),
        Procedure => visitor.visit_procedure(item),
        Function | Udf => visitor.visit_function(item),
        Generator => visitor.visit_generator(item),
        Exception => visitor.visit_exception(item),
        Index | SystemIndex => visitor.visit_index(item),
        Package | SystemPackage => visitor.visit_package(item),
        Role | SystemRole => visitor.visit_role(item),
        User => visitor.visit_user(item),
        Collation => visitor.visit_collation(item),
        CharacterSet => visitor.visit_character_set(item),
        _ => {}
    }
}

/// Visitor that renders CREATE statement text
#[derive(Debug, Default)]
pub struct CreateDdlBuilder {
    ddl: String,
}

impl CreateDdlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated statement text
    pub fn ddl(&self) -> &str {
        &self.ddl
    }

    pub fn into_ddl(self) -> String {
        self.ddl
    }
}

/// Render the CREATE statement for one item
pub fn create_ddl(item: &Arc<MetadataItem>) -> String {
    let mut builder = CreateDdlBuilder::new();
    accept(item, &mut builder);
    builder.into_ddl()
}

impl MetadataVisitor for CreateDdlBuilder {
    fn visit_table(&mut self, item: &Arc<MetadataItem>) {
        let mut columns = Vec::new();
        for column in relation::columns(item) {
            column.with_properties(|props| {
                if let Properties::Column(p) = props {
                    let mut line = format!("  {} {}", column.quoted_name(), column_type(p));
                    if let Some(default) = &p.default_source {
                        line += &format!(" {}", default);
                    }
                    if p.not_null {
                        line += " NOT NULL";
                    }
                    columns.push(line);
                }
            });
        }
        if item.kind() == ObjectKind::GlobalTemporaryTable {
            self.ddl += &format!(
                "CREATE GLOBAL TEMPORARY TABLE {} (\n{}\n);\n",
                item.quoted_name(),
                columns.join(",\n")
            );
        } else {
            self.ddl += &format!(
                "CREATE TABLE {} (\n{}\n);\n",
                item.quoted_name(),
                columns.join(",\n")
            );
        }
    }

    fn visit_view(&mut self, item: &Arc<MetadataItem>) {
        let column_names: Vec<String> = relation::columns(item)
            .iter()
            .map(|c| c.quoted_name())
            .collect();
        let source = item.with_properties(|props| match props {
            Properties::Relation(p) => p.view_source.clone().unwrap_or_default(),
            _ => String::new(),
        });
        self.ddl += &format!(
            "CREATE VIEW {} ({})\nAS\n{}\n;\n",
            item.quoted_name(),
            column_names.join(", "),
            source.trim()
        );
    }

    fn visit_trigger(&mut self, item: &Arc<MetadataItem>) {
        self.ddl += &trigger::alter_sql(item);
    }

    fn visit_domain(&mut self, item: &Arc<MetadataItem>) {
        item.with_properties(|props| {
            if let Properties::Domain(p) = props {
                let mut sql = format!(
                    "CREATE DOMAIN {} AS {}",
                    item.quoted_name(),
                    p.datatype()
                );
                if let Some(default) = &p.default_source {
                    sql += &format!("\n  {}", default);
                }
                if p.not_null {
                    sql += "\n  NOT NULL";
                }
                if let Some(check) = &p.check_constraint {
                    sql += &format!("\n  {}", check);
                }
                sql += ";\n";
                self.ddl += &sql;
            }
        });
    }

    fn visit_procedure(&mut self, item: &Arc<MetadataItem>) {
        item.with_properties(|props| {
            if let Properties::Procedure(p) = props {
                self.ddl += "SET TERM ^ ;\n";
                self.ddl += &format!(
                    "CREATE OR ALTER PROCEDURE {}\nAS\n{}^\n",
                    item.quoted_name(),
                    p.source.clone().unwrap_or_default().trim_start()
                );
                self.ddl += "SET TERM ; ^\n";
            }
        });
    }

    fn visit_generator(&mut self, item: &Arc<MetadataItem>) {
        self.ddl += &format!("CREATE SEQUENCE {};\n", item.quoted_name());
    }

    fn visit_exception(&mut self, item: &Arc<MetadataItem>) {
        item.with_properties(|props| {
            if let Properties::Exception(p) = props {
                self.ddl += &format!(
                    "CREATE EXCEPTION {} '{}';\n",
                    item.quoted_name(),
                    p.message.replace('\'', "''")
                );
            }
        });
    }

    fn visit_index(&mut self, item: &Arc<MetadataItem>) {
        item.with_properties(|props| {
            if let Properties::Index(p) = props {
                let segments: Vec<String> = p.segments.iter().map(|s| s.quoted()).collect();
                self.ddl += &format!(
                    "CREATE {}INDEX {} ON {} ({});\n",
                    if p.unique { "UNIQUE " } else { "" },
                    item.quoted_name(),
                    p.relation_name
                        .as_ref()
                        .map(|n| n.quoted())
                        .unwrap_or_default(),
                    segments.join(", ")
                );
            }
        });
    }

    fn visit_package(&mut self, item: &Arc<MetadataItem>) {
        item.with_properties(|props| {
            if let Properties::Package(p) = props {
                self.ddl += "SET TERM ^ ;\n";
                self.ddl += &format!(
                    "CREATE PACKAGE {}\nAS\n{}^\n",
                    item.quoted_name(),
                    p.header_source.clone().unwrap_or_default().trim()
                );
                if let Some(body) = &p.body_source {
                    self.ddl += &format!(
                        "CREATE PACKAGE BODY {}\nAS\n{}^\n",
                        item.quoted_name(),
                        body.trim()
                    );
                }
                self.ddl += "SET TERM ; ^\n";
            }
        });
    }

    fn visit_role(&mut self, item: &Arc<MetadataItem>) {
        self.ddl += &format!("CREATE ROLE {};\n", item.quoted_name());
    }

    fn visit_user(&mut self, item: &Arc<MetadataItem>) {
        self.ddl += &user::alter_sql(item);
    }
}

fn column_type(props: &crate::relation::ColumnProps) -> String {
    match &props.source {
        // user domains are referenced by name; auto-created RDB$ ones
        // expand to their datatype
        Some(source) if !source.has_system_prefix() => source.quoted(),
        _ => props.datatype.clone(),
    }
}

#[cfg(test)]
#[path = "ddl_tests.rs"]
mod tests;
