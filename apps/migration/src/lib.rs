//! Schema migrations for the Postboard database.

use sea_orm_migration::prelude::*;

mod migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m20250101_000001_create_users::Migration),
            Box::new(migrations::m20250101_000002_create_posts::Migration),
            Box::new(migrations::m20250101_000003_create_comments::Migration),
            Box::new(migrations::m20250101_000004_create_votes::Migration),
            Box::new(migrations::m20250101_000005_create_sessions::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered_and_unique() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
    }
}
