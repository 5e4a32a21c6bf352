//! Partition of a statement sequence into per-table groups.
//!
//! Keys enumerate in byte order of the table identifier with the unassigned
//! bucket always last, so dispatch order is reproducible across runs.

use std::collections::BTreeMap;
use std::fmt;

use crate::extract::extract_table_name;
use crate::segment::Statement;

/// Key of a [`TableGroups`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey<'a> {
    Table(&'a str),
    /// Statements whose target table could not be recovered.
    Unassigned,
}

impl fmt::Display for GroupKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Table(name) => f.write_str(name),
            GroupKey::Unassigned => f.write_str("unassigned"),
        }
    }
}

/// Every statement of a run, each in exactly one group, in source order within its group.
///
/// The unassigned bucket is a separate slot, so a table literally called
/// `unassigned` is still an ordinary named group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGroups {
    named: BTreeMap<String, Vec<Statement>>,
    unassigned: Vec<Statement>,
}

impl TableGroups {
    /// Named groups in dispatch order.
    pub fn named(&self) -> impl Iterator<Item = (&str, &[Statement])> {
        self.named
            .iter()
            .map(|(name, statements)| (name.as_str(), statements.as_slice()))
    }

    pub fn unassigned(&self) -> &[Statement] {
        &self.unassigned
    }

    /// All groups, named ones first, unassigned last (only when non-empty).
    pub fn iter(&self) -> impl Iterator<Item = (GroupKey<'_>, &[Statement])> {
        let unassigned = (!self.unassigned.is_empty())
            .then_some((GroupKey::Unassigned, self.unassigned.as_slice()));
        self.named()
            .map(|(name, statements)| (GroupKey::Table(name), statements))
            .chain(unassigned)
    }

    pub fn get(&self, table: &str) -> Option<&[Statement]> {
        self.named.get(table).map(Vec::as_slice)
    }

    pub fn named_len(&self) -> usize {
        self.named.len()
    }

    pub fn statement_count(&self) -> usize {
        self.named.values().map(Vec::len).sum::<usize>() + self.unassigned.len()
    }
}

/// Route each statement to the group of the table it targets.
pub fn group<I>(statements: I) -> TableGroups
where
    I: IntoIterator<Item = Statement>,
{
    let mut groups = TableGroups::default();
    for statement in statements {
        match extract_table_name(statement.as_str()) {
            Some(table) => {
                let table = table.to_string();
                groups.named.entry(table).or_default().push(statement);
            }
            None => groups.unassigned.push(statement),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;

    const DUMP: &str = "\
        CREATE TABLE Usuarios (id_usuario INT, id_rol INT);\n\
        INSERT INTO Roles VALUES (1, 'admin');\n\
        CREATE TABLE Roles (id_rol INT PRIMARY KEY);\n\
        ALTER TABLE Usuarios ADD FOREIGN KEY (id_rol) REFERENCES Roles(id_rol);\n\
        CREATE INDEX idx ON Usuarios (id_rol);\n\
        DROP TABLE IF EXISTS `roles`;\n";

    #[test]
    fn groups_by_table_in_source_order() {
        let groups = group(segment(DUMP));
        let usuarios: Vec<&str> = groups
            .get("Usuarios")
            .expect("Usuarios group")
            .iter()
            .map(Statement::as_str)
            .collect();
        assert_eq!(
            usuarios,
            vec![
                "CREATE TABLE Usuarios (id_usuario INT, id_rol INT);",
                "ALTER TABLE Usuarios ADD FOREIGN KEY (id_rol) REFERENCES Roles(id_rol);",
            ]
        );
    }

    #[test]
    fn keys_are_case_sensitive_and_sorted_with_unassigned_last() {
        let groups = group(segment(DUMP));
        let keys: Vec<String> = groups.iter().map(|(key, _)| key.to_string()).collect();
        assert_eq!(keys, vec!["Roles", "Usuarios", "roles", "unassigned"]);
        assert_eq!(groups.named_len(), 3);
        assert_eq!(groups.unassigned().len(), 2);
    }

    #[test]
    fn every_statement_lands_in_exactly_one_group() {
        let statements = segment(DUMP);
        let groups = group(statements.clone());
        assert_eq!(groups.statement_count(), statements.len());

        let mut seen: Vec<&Statement> = groups.iter().flat_map(|(_, s)| s.iter()).collect();
        let mut expected: Vec<&Statement> = statements.iter().collect();
        seen.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        expected.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(seen, expected);
    }

    #[test]
    fn table_named_unassigned_is_not_the_reserved_bucket() {
        let groups = group(segment("CREATE TABLE unassigned (id INT); SELECT 1;"));
        let keys: Vec<GroupKey<'_>> = groups.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![GroupKey::Table("unassigned"), GroupKey::Unassigned]);
    }

    #[test]
    fn no_unassigned_key_when_bucket_is_empty() {
        let groups = group(segment("CREATE TABLE a (id INT);"));
        assert_eq!(groups.iter().count(), 1);
        assert!(group(Vec::new()).iter().next().is_none());
    }
}
