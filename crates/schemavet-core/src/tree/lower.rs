//! Lowering from `sqlparser` ASTs into the generic [`Node`] tree.
//!
//! Child order follows source order: ALTER TABLE operations become children
//! in their listed order, CREATE TABLE columns before table constraints.
//! Rules that resolve conflicting detections by "first seen" therefore
//! observe source order.

use sqlparser::ast::{
    self, AlterTableOperation, BinaryOperator, ColumnDef, ColumnOption, Expr, ObjectName,
    ObjectType, RenameTableNameKind, SetExpr, Statement, TableConstraint, TableFactor,
    TableWithJoins,
};

use super::{ConstraintKind, Node, NodeBody};

/// Lowers one parsed statement into its advisory tree.
pub fn lower_statement(statement: &Statement) -> Node {
    match statement {
        Statement::CreateTable(create) => {
            let mut children: Vec<Node> = Vec::new();
            for column in &create.columns {
                children.push(lower_column_def(column));
                children.extend(inline_column_keys(column).into_iter().map(|(kind, name)| {
                    Node::new(NodeBody::TableConstraint {
                        kind,
                        name,
                        column_count: 1,
                    })
                }));
            }
            children.extend(create.constraints.iter().map(|constraint| {
                let (kind, name, column_count) = lower_constraint(constraint);
                Node::new(NodeBody::TableConstraint {
                    kind,
                    name,
                    column_count,
                })
            }));
            Node::with_children(
                NodeBody::CreateTable {
                    table: object_tail(&create.name),
                    if_not_exists: create.if_not_exists,
                },
                children,
            )
        }

        Statement::CreateIndex(create) => Node::new(NodeBody::CreateIndex {
            index: create.name.as_ref().map(object_tail),
            table: object_tail(&create.table_name),
            unique: create.unique,
            column_count: create.columns.len(),
        }),

        Statement::AlterTable {
            name, operations, ..
        } => {
            let table = object_tail(name);
            let children = operations
                .iter()
                .flat_map(|operation| lower_alter_operation(&table, operation))
                .collect();
            Node::with_children(NodeBody::AlterTable { table }, children)
        }

        Statement::Drop {
            object_type, names, ..
        } => match object_type {
            ObjectType::Table => Node::new(NodeBody::DropTable {
                tables: names.iter().map(object_tail).collect(),
            }),
            ObjectType::Index => Node::new(NodeBody::DropIndex {
                indexes: names.iter().map(object_tail).collect(),
            }),
            ObjectType::Database | ObjectType::Schema => Node::new(NodeBody::DropDatabase {
                database: names.first().map(object_tail).unwrap_or_default(),
            }),
            _ => Node::new(NodeBody::Generic),
        },

        Statement::RenameTable(renames) => {
            let mut nodes: Vec<Node> = renames
                .iter()
                .map(|rename| {
                    Node::new(NodeBody::RenameTable {
                        table: object_tail(&rename.old_name),
                        to: object_tail(&rename.new_name),
                    })
                })
                .collect();
            if nodes.len() == 1 {
                nodes.remove(0)
            } else {
                Node::with_children(NodeBody::Generic, nodes)
            }
        }

        Statement::Insert(insert) => Node::new(NodeBody::Insert {
            table: insert.table.to_string(),
        }),

        Statement::Update {
            table, selection, ..
        } => Node::with_children(
            NodeBody::Update {
                table: table_with_joins_name(table),
            },
            lower_selection(selection.as_ref()),
        ),

        Statement::Delete(delete) => {
            let tables = match &delete.from {
                ast::FromTable::WithFromKeyword(tables)
                | ast::FromTable::WithoutKeyword(tables) => {
                    tables.iter().map(table_with_joins_name).collect()
                }
            };
            Node::with_children(
                NodeBody::Delete { tables },
                lower_selection(delete.selection.as_ref()),
            )
        }

        Statement::Query(query) => {
            let children = match query.body.as_ref() {
                SetExpr::Select(select) => lower_selection(select.selection.as_ref()),
                _ => Vec::new(),
            };
            Node::with_children(NodeBody::Query, children)
        }

        _ => Node::new(NodeBody::Generic),
    }
}

fn lower_alter_operation(table: &str, operation: &AlterTableOperation) -> Vec<Node> {
    match operation {
        // Inline PRIMARY KEY / UNIQUE on the added column count as key
        // additions, so they become AddConstraint siblings.
        AlterTableOperation::AddColumn { column_def, .. } => {
            let mut nodes = vec![Node::with_children(
                NodeBody::AddColumn {
                    column: column_def.name.value.clone(),
                },
                vec![lower_column_def(column_def)],
            )];
            nodes.extend(
                inline_column_keys(column_def)
                    .into_iter()
                    .map(|(kind, name)| {
                        Node::new(NodeBody::AddConstraint {
                            kind,
                            name,
                            column_count: 1,
                        })
                    }),
            );
            nodes
        }

        AlterTableOperation::DropColumn { column_names, .. } => {
            vec![Node::new(NodeBody::DropColumn {
                columns: column_names
                    .iter()
                    .map(|ident| ident.value.clone())
                    .collect(),
            })]
        }

        AlterTableOperation::RenameColumn {
            old_column_name,
            new_column_name,
        } => vec![Node::new(NodeBody::RenameColumn {
            from: old_column_name.value.clone(),
            to: new_column_name.value.clone(),
        })],

        AlterTableOperation::ModifyColumn { col_name, .. } => {
            vec![Node::new(NodeBody::ModifyColumn {
                column: col_name.value.clone(),
            })]
        }

        // MySQL CHANGE keeps the column when both names agree, otherwise it
        // is a rename.
        AlterTableOperation::ChangeColumn {
            old_name, new_name, ..
        } => {
            if old_name.value == new_name.value {
                vec![Node::new(NodeBody::ModifyColumn {
                    column: new_name.value.clone(),
                })]
            } else {
                vec![Node::new(NodeBody::RenameColumn {
                    from: old_name.value.clone(),
                    to: new_name.value.clone(),
                })]
            }
        }

        AlterTableOperation::AlterColumn { column_name, .. } => {
            vec![Node::new(NodeBody::ModifyColumn {
                column: column_name.value.clone(),
            })]
        }

        AlterTableOperation::AddConstraint { constraint, .. } => {
            let (kind, name, column_count) = lower_constraint(constraint);
            vec![Node::new(NodeBody::AddConstraint {
                kind,
                name,
                column_count,
            })]
        }

        AlterTableOperation::DropConstraint { name, .. } => {
            vec![Node::new(NodeBody::DropConstraint {
                name: name.value.clone(),
            })]
        }

        AlterTableOperation::RenameTable { table_name } => {
            let (RenameTableNameKind::As(to) | RenameTableNameKind::To(to)) = table_name;
            vec![Node::new(NodeBody::RenameTable {
                table: table.to_string(),
                to: object_tail(to),
            })]
        }

        _ => Vec::new(),
    }
}

fn lower_column_def(column: &ColumnDef) -> Node {
    let charset = column.options.iter().find_map(|option| match &option.option {
        ColumnOption::CharacterSet(name) => Some(name.to_string()),
        _ => None,
    });
    Node::new(NodeBody::ColumnDef {
        column: column.name.value.clone(),
        charset,
    })
}

/// Key constraints declared inline on a column definition, as
/// `(kind, constraint name)` pairs.
fn inline_column_keys(column: &ColumnDef) -> Vec<(ConstraintKind, Option<String>)> {
    column
        .options
        .iter()
        .filter_map(|option| match &option.option {
            ColumnOption::Unique { is_primary, .. } => {
                let kind = if *is_primary {
                    ConstraintKind::PrimaryKey
                } else {
                    ConstraintKind::Unique
                };
                Some((kind, option.name.as_ref().map(|ident| ident.value.clone())))
            }
            _ => None,
        })
        .collect()
}

fn lower_constraint(constraint: &TableConstraint) -> (ConstraintKind, Option<String>, usize) {
    match constraint {
        TableConstraint::PrimaryKey { name, columns, .. } => (
            ConstraintKind::PrimaryKey,
            name.as_ref().map(|ident| ident.value.clone()),
            columns.len(),
        ),
        TableConstraint::Unique { name, columns, .. } => (
            ConstraintKind::Unique,
            name.as_ref().map(|ident| ident.value.clone()),
            columns.len(),
        ),
        TableConstraint::ForeignKey { name, columns, .. } => (
            ConstraintKind::ForeignKey,
            name.as_ref().map(|ident| ident.value.clone()),
            columns.len(),
        ),
        TableConstraint::Check { name, .. } => (
            ConstraintKind::Check,
            name.as_ref().map(|ident| ident.value.clone()),
            0,
        ),
        TableConstraint::Index { name, columns, .. } => (
            ConstraintKind::Index,
            name.as_ref().map(|ident| ident.value.clone()),
            columns.len(),
        ),
        TableConstraint::FulltextOrSpatial {
            opt_index_name,
            columns,
            ..
        } => (
            ConstraintKind::Index,
            opt_index_name.as_ref().map(|ident| ident.value.clone()),
            columns.len(),
        ),
    }
}

fn lower_selection(selection: Option<&Expr>) -> Vec<Node> {
    match selection {
        Some(expr) => vec![Node::with_children(NodeBody::Where, lower_or_nodes(expr))],
        None => Vec::new(),
    }
}

/// Collects OR operators in an expression as nested `Or` nodes, preserving
/// the parse tree's nesting so depth rules see real nesting levels.
fn lower_or_nodes(expr: &Expr) -> Vec<Node> {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Or,
            right,
        } => {
            let mut children = lower_or_nodes(left);
            children.extend(lower_or_nodes(right));
            vec![Node::with_children(NodeBody::Or, children)]
        }
        Expr::BinaryOp { left, right, .. } => {
            let mut nodes = lower_or_nodes(left);
            nodes.extend(lower_or_nodes(right));
            nodes
        }
        Expr::Nested(inner) | Expr::UnaryOp { expr: inner, .. } => lower_or_nodes(inner),
        _ => Vec::new(),
    }
}

/// Unqualified tail of a possibly-qualified object name.
fn object_tail(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| name.to_string())
}

fn table_with_joins_name(table: &TableWithJoins) -> String {
    match &table.relation {
        TableFactor::Table { name, .. } => object_tail(name),
        other => other.to_string(),
    }
}
