//! Column character-set allow-list.
//!
//! Every column definition — inline in CREATE TABLE or added through ALTER
//! TABLE — must use a character set from the configured list. A column with
//! no explicit character set participates as the empty string, so an
//! allow-list of `["", "binary"]` accepts unannotated columns but rejects
//! explicit ones like `utf8`.

use crate::advice::{codes, normalized_line, Advice, Severity};
use crate::parser::SourceStatement;
use crate::rule::{FinishContext, Rule, RuleError, StateScope};
use crate::tree::{Node, NodeBody, Tag};

const TITLE: &str = "Disallowed character set";

pub struct ColumnCharsetAllowlist {
    severity: Severity,
    /// Lowercased allow-list.
    allowed: Vec<String>,
    /// Text and visible line of the statement being walked.
    statement: Option<(String, usize)>,
    advice: Vec<Advice>,
}

impl ColumnCharsetAllowlist {
    pub fn new(severity: Severity, allowed: &[String]) -> Self {
        Self {
            severity,
            allowed: allowed.iter().map(|cs| cs.to_lowercase()).collect(),
            statement: None,
            advice: Vec::new(),
        }
    }
}

impl Rule for ColumnCharsetAllowlist {
    fn name(&self) -> &'static str {
        "column-charset-allowlist"
    }

    fn scope(&self) -> StateScope {
        StateScope::PerStatement
    }

    fn begin_statement(&mut self, stmt: &SourceStatement) {
        self.statement = Some((stmt.text.clone(), normalized_line(stmt.base_line, 1)));
    }

    fn on_enter(&mut self, node: &Node, _tag: Tag) -> Result<(), RuleError> {
        let NodeBody::ColumnDef { column, charset } = &node.body else {
            return Ok(());
        };
        let charset = charset.as_deref().unwrap_or("").to_lowercase();
        if self.allowed.iter().any(|allowed| *allowed == charset) {
            return Ok(());
        }
        if let Some((text, line)) = &self.statement {
            self.advice.push(
                Advice::new(
                    self.severity,
                    codes::COLUMN_CHARSET_DISALLOWED,
                    TITLE,
                    format!(
                        "\"{text}\" uses the disallowed character set \"{charset}\" for column `{column}`"
                    ),
                )
                .with_position(*line, 0),
            );
        }
        Ok(())
    }

    fn take_advice(&mut self, _ctx: &FinishContext<'_>) -> Vec<Advice> {
        std::mem::take(&mut self.advice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::walk;
    use crate::parser::{split_statements, Dialect};
    use crate::tree::lower_statement;

    fn run(sql: &str, allowed: &[&str]) -> Vec<Advice> {
        let statements = split_statements(sql, Dialect::Mysql).expect("parse");
        let allowed: Vec<String> = allowed.iter().map(|cs| cs.to_string()).collect();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(ColumnCharsetAllowlist::new(
            Severity::Warning,
            &allowed,
        ))];
        for statement in &statements {
            let root = lower_statement(&statement.ast);
            for rule in &mut rules {
                rule.begin_statement(statement);
            }
            walk(&root, &mut rules);
            for rule in &mut rules {
                rule.end_statement(statement);
            }
        }
        rules[0].take_advice(&FinishContext { catalog: None })
    }

    #[test]
    fn flags_disallowed_charset_in_alter() {
        let sql = "CREATE TABLE t1 (id INT);\n\
                   ALTER TABLE t1 ADD COLUMN name VARCHAR(10) CHARACTER SET utf8";
        let advice = run(sql, &["", "binary"]);
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].severity, Severity::Warning);
        assert!(advice[0]
            .content
            .contains("ALTER TABLE t1 ADD COLUMN name VARCHAR(10) CHARACTER SET utf8"));
        assert_eq!(advice[0].position.unwrap().line, 1);
    }

    #[test]
    fn unannotated_columns_pass_with_empty_entry() {
        assert!(run("CREATE TABLE t (id INT)", &["", "binary"]).is_empty());
    }

    #[test]
    fn unannotated_columns_fail_without_empty_entry() {
        let advice = run("CREATE TABLE t (id INT)", &["utf8mb4"]);
        assert_eq!(advice.len(), 1);
        assert!(advice[0].content.contains("`id`"));
    }

    #[test]
    fn comparison_is_case_insensitive() {
        assert!(run(
            "ALTER TABLE t ADD COLUMN c VARCHAR(10) CHARACTER SET UTF8MB4",
            &["utf8mb4"]
        )
        .is_empty());
    }

    #[test]
    fn one_advice_per_offending_column() {
        let advice = run(
            "CREATE TABLE t (a VARCHAR(10) CHARACTER SET utf8, b VARCHAR(10) CHARACTER SET latin1)",
            &["", "binary"],
        );
        assert_eq!(advice.len(), 2);
    }
}
