//! Best-effort SQL text rendering of a design.
//!
//! Textual scaffolding, not validated DDL: foreign keys use a fixed `id`
//! column convention and the output is not guaranteed to run against a
//! real engine.

use crate::schema::graph::SchemaGraph;

impl SchemaGraph {
    /// Render one `CREATE TABLE` per table and one `ALTER TABLE ... ADD
    /// CONSTRAINT ... FOREIGN KEY` per relationship.
    pub fn to_sql(&self, design_name: &str) -> String {
        let mut sql = format!("-- {} database schema\n\n", design_name);

        for table in self.tables() {
            sql.push_str(&format!("CREATE TABLE {} (\n", table.name));
            let columns: Vec<String> = table
                .columns
                .iter()
                .map(|column| {
                    let mut definition = format!("  {} {}", column.name, column.ty);
                    if !column.nullable {
                        definition.push_str(" NOT NULL");
                    }
                    if column.primary {
                        definition.push_str(" PRIMARY KEY");
                    }
                    definition
                })
                .collect();
            sql.push_str(&columns.join(",\n"));
            sql.push_str("\n);\n\n");
        }

        for relationship in self.relationships() {
            let source = self.get_table(&relationship.source_table_id);
            let target = self.get_table(&relationship.target_table_id);
            if let (Some(source), Some(target)) = (source, target) {
                sql.push_str(&format!(
                    "ALTER TABLE {} ADD CONSTRAINT fk_{}_{} FOREIGN KEY (id) REFERENCES {}(id);\n",
                    source.name, source.name, target.name, target.name
                ));
            }
        }

        sql
    }
}
