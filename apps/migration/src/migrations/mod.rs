pub mod m20250101_000001_create_users;
pub mod m20250101_000002_create_posts;
pub mod m20250101_000003_create_comments;
pub mod m20250101_000004_create_votes;
pub mod m20250101_000005_create_sessions;
