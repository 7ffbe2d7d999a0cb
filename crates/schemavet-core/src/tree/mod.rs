//! Generic syntax-tree model consumed by advisory rules.
//!
//! Rules never see `sqlparser` types. Each parsed statement is lowered into a
//! small [`Node`] tree whose [`NodeBody`] variants carry just the semantic
//! payload the rules need (names, charsets, constraint kinds). The node's
//! grammar category is a closed [`Tag`] enum, so tag resolution is a total
//! function checked at compile time rather than runtime type inspection.

pub mod lower;

pub use lower::lower_statement;

/// Canonical grammar category of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    CreateTable,
    CreateIndex,
    AlterTable,
    DropTable,
    DropIndex,
    DropDatabase,
    RenameTable,
    AddColumn,
    DropColumn,
    RenameColumn,
    ModifyColumn,
    AddConstraint,
    AlterConstraint,
    DropConstraint,
    TableConstraint,
    ColumnDef,
    Insert,
    Update,
    Delete,
    Query,
    Where,
    Or,
    Generic,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::CreateTable => "CreateTable",
            Tag::CreateIndex => "CreateIndex",
            Tag::AlterTable => "AlterTable",
            Tag::DropTable => "DropTable",
            Tag::DropIndex => "DropIndex",
            Tag::DropDatabase => "DropDatabase",
            Tag::RenameTable => "RenameTable",
            Tag::AddColumn => "AddColumn",
            Tag::DropColumn => "DropColumn",
            Tag::RenameColumn => "RenameColumn",
            Tag::ModifyColumn => "ModifyColumn",
            Tag::AddConstraint => "AddConstraint",
            Tag::AlterConstraint => "AlterConstraint",
            Tag::DropConstraint => "DropConstraint",
            Tag::TableConstraint => "TableConstraint",
            Tag::ColumnDef => "ColumnDef",
            Tag::Insert => "Insert",
            Tag::Update => "Update",
            Tag::Delete => "Delete",
            Tag::Query => "Query",
            Tag::Where => "Where",
            Tag::Or => "Or",
            Tag::Generic => "Generic",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a table constraint, for both inline and ALTER-added constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
    /// Plain secondary index (MySQL `KEY`/`INDEX`).
    Index,
}

/// Semantic payload of a node.
///
/// `AddConstraint` is used for ALTER TABLE operations against an existing
/// table; `TableConstraint` for constraints listed inside CREATE TABLE, so
/// rules that only care about existing-table mutations can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    CreateTable {
        table: String,
        if_not_exists: bool,
    },
    CreateIndex {
        index: Option<String>,
        table: String,
        unique: bool,
        column_count: usize,
    },
    AlterTable {
        table: String,
    },
    DropTable {
        tables: Vec<String>,
    },
    DropIndex {
        indexes: Vec<String>,
    },
    DropDatabase {
        database: String,
    },
    RenameTable {
        table: String,
        to: String,
    },
    AddColumn {
        column: String,
    },
    DropColumn {
        columns: Vec<String>,
    },
    RenameColumn {
        from: String,
        to: String,
    },
    ModifyColumn {
        column: String,
    },
    AddConstraint {
        kind: ConstraintKind,
        name: Option<String>,
        column_count: usize,
    },
    /// In-place change to a named constraint (e.g. MySQL `ALTER CHECK`).
    /// sqlparser has no syntax that lowers to this yet; callers that build
    /// trees directly can still emit it and rules classify it.
    AlterConstraint {
        name: String,
    },
    DropConstraint {
        name: String,
    },
    TableConstraint {
        kind: ConstraintKind,
        name: Option<String>,
        column_count: usize,
    },
    ColumnDef {
        column: String,
        charset: Option<String>,
    },
    Insert {
        table: String,
    },
    Update {
        table: String,
    },
    Delete {
        tables: Vec<String>,
    },
    Query,
    Where,
    Or,
    Generic,
}

/// One node of the lowered tree. Nodes carry no position of their own;
/// rules anchor findings on the statement's `base_line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub body: NodeBody,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(body: NodeBody) -> Self {
        Self {
            body,
            children: Vec::new(),
        }
    }

    pub fn with_children(body: NodeBody, children: Vec<Node>) -> Self {
        Self { body, children }
    }

    /// Resolves this node's grammar category.
    pub fn tag(&self) -> Tag {
        match self.body {
            NodeBody::CreateTable { .. } => Tag::CreateTable,
            NodeBody::CreateIndex { .. } => Tag::CreateIndex,
            NodeBody::AlterTable { .. } => Tag::AlterTable,
            NodeBody::DropTable { .. } => Tag::DropTable,
            NodeBody::DropIndex { .. } => Tag::DropIndex,
            NodeBody::DropDatabase { .. } => Tag::DropDatabase,
            NodeBody::RenameTable { .. } => Tag::RenameTable,
            NodeBody::AddColumn { .. } => Tag::AddColumn,
            NodeBody::DropColumn { .. } => Tag::DropColumn,
            NodeBody::RenameColumn { .. } => Tag::RenameColumn,
            NodeBody::ModifyColumn { .. } => Tag::ModifyColumn,
            NodeBody::AddConstraint { .. } => Tag::AddConstraint,
            NodeBody::AlterConstraint { .. } => Tag::AlterConstraint,
            NodeBody::DropConstraint { .. } => Tag::DropConstraint,
            NodeBody::TableConstraint { .. } => Tag::TableConstraint,
            NodeBody::ColumnDef { .. } => Tag::ColumnDef,
            NodeBody::Insert { .. } => Tag::Insert,
            NodeBody::Update { .. } => Tag::Update,
            NodeBody::Delete { .. } => Tag::Delete,
            NodeBody::Query => Tag::Query,
            NodeBody::Where => Tag::Where,
            NodeBody::Or => Tag::Or,
            NodeBody::Generic => Tag::Generic,
        }
    }
}
