//! Idempotent schema migration, executed through the pool at startup.

use sqlx::Executor;

use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};

const SCHEMA_DDL: &str = r#"
    DO $$ BEGIN
        CREATE TYPE card_status AS ENUM (
            'processing', 'completed', 'failed', 'pending_review', 'user_verified'
        );
    EXCEPTION WHEN duplicate_object THEN NULL; END $$;

    DO $$ BEGIN
        CREATE TYPE email_status AS ENUM ('draft', 'sent_to_gmail', 'sent', 'failed');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$;

    CREATE TABLE IF NOT EXISTS organizations (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        org_id BIGINT REFERENCES organizations(id),
        email TEXT NOT NULL UNIQUE,
        first_name TEXT,
        last_name TEXT,
        image_url TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS events (
        id BIGSERIAL PRIMARY KEY,
        org_id BIGINT NOT NULL REFERENCES organizations(id),
        user_id TEXT NOT NULL REFERENCES users(id),
        name TEXT NOT NULL,
        description TEXT,
        industry TEXT,
        location TEXT,
        start_date DATE,
        end_date DATE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_events_org_id ON events(org_id);
    CREATE INDEX IF NOT EXISTS idx_events_user_id ON events(user_id);

    CREATE TABLE IF NOT EXISTS business_cards (
        id BIGSERIAL PRIMARY KEY,
        org_id BIGINT NOT NULL REFERENCES organizations(id),
        user_id TEXT NOT NULL REFERENCES users(id),
        event_id BIGINT REFERENCES events(id),
        storage_path TEXT NOT NULL,
        status card_status NOT NULL DEFAULT 'processing',
        ocr_data JSONB,
        confidence_score NUMERIC(5, 2),
        uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        processed_at TIMESTAMPTZ
    );

    CREATE INDEX IF NOT EXISTS idx_business_cards_status ON business_cards(status);

    CREATE TABLE IF NOT EXISTS contacts (
        id BIGSERIAL PRIMARY KEY,
        org_id BIGINT NOT NULL REFERENCES organizations(id),
        user_id TEXT NOT NULL REFERENCES users(id),
        event_id BIGINT REFERENCES events(id),
        card_id BIGINT REFERENCES business_cards(id),
        full_name TEXT NOT NULL,
        company TEXT,
        title TEXT,
        phone TEXT,
        email TEXT,
        ocr_confidence NUMERIC(5, 2),
        is_verified BOOLEAN NOT NULL DEFAULT FALSE,
        verified_at TIMESTAMPTZ,
        verified_by TEXT REFERENCES users(id),
        linkedin_url TEXT,
        website TEXT,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT unique_org_email UNIQUE (org_id, email)
    );

    CREATE INDEX IF NOT EXISTS idx_contacts_org_id ON contacts(org_id);
    CREATE INDEX IF NOT EXISTS idx_contacts_user_id ON contacts(user_id);
    CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email);
    CREATE INDEX IF NOT EXISTS idx_contacts_company ON contacts(company);
    CREATE INDEX IF NOT EXISTS idx_contacts_full_name ON contacts(full_name);

    CREATE TABLE IF NOT EXISTS lead_groups (
        id BIGSERIAL PRIMARY KEY,
        org_id BIGINT NOT NULL REFERENCES organizations(id),
        user_id TEXT NOT NULL REFERENCES users(id),
        name TEXT NOT NULL,
        description TEXT,
        color TEXT NOT NULL DEFAULT '#3B82F6',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_lead_groups_org_id ON lead_groups(org_id);

    CREATE TABLE IF NOT EXISTS lead_group_contacts (
        lead_group_id BIGINT NOT NULL REFERENCES lead_groups(id) ON DELETE CASCADE,
        contact_id BIGINT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
        added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (lead_group_id, contact_id)
    );

    CREATE TABLE IF NOT EXISTS email_templates (
        id BIGSERIAL PRIMARY KEY,
        org_id BIGINT NOT NULL REFERENCES organizations(id),
        user_id TEXT NOT NULL REFERENCES users(id),
        name TEXT NOT NULL,
        subject TEXT NOT NULL,
        body TEXT NOT NULL,
        is_default BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT unique_org_template_name UNIQUE (org_id, name)
    );

    CREATE TABLE IF NOT EXISTS gmail_connections (
        id BIGSERIAL PRIMARY KEY,
        user_id TEXT NOT NULL UNIQUE REFERENCES users(id),
        email TEXT NOT NULL,
        access_token TEXT,
        refresh_token TEXT,
        token_expiry TIMESTAMPTZ,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        connected_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        last_sync_at TIMESTAMPTZ
    );

    CREATE TABLE IF NOT EXISTS email_drafts (
        id BIGSERIAL PRIMARY KEY,
        org_id BIGINT NOT NULL REFERENCES organizations(id),
        user_id TEXT NOT NULL REFERENCES users(id),
        contact_id BIGINT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
        template_id BIGINT REFERENCES email_templates(id) ON DELETE SET NULL,
        lead_group_id BIGINT REFERENCES lead_groups(id) ON DELETE SET NULL,
        subject TEXT NOT NULL,
        body TEXT NOT NULL,
        status email_status NOT NULL DEFAULT 'draft',
        gmail_draft_id TEXT,
        sent_to_gmail_at TIMESTAMPTZ,
        sent_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_email_drafts_status ON email_drafts(status);

    CREATE TABLE IF NOT EXISTS daily_stats (
        id BIGSERIAL PRIMARY KEY,
        org_id BIGINT NOT NULL REFERENCES organizations(id),
        date DATE NOT NULL,
        cards_uploaded INTEGER NOT NULL DEFAULT 0,
        contacts_created INTEGER NOT NULL DEFAULT 0,
        contacts_verified INTEGER NOT NULL DEFAULT 0,
        drafts_generated INTEGER NOT NULL DEFAULT 0,
        drafts_sent_to_gmail INTEGER NOT NULL DEFAULT 0,
        emails_sent INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT unique_org_date UNIQUE (org_id, date)
    );

    CREATE INDEX IF NOT EXISTS idx_daily_stats_org_date ON daily_stats(org_id, date);

    CREATE TABLE IF NOT EXISTS activity_logs (
        id BIGSERIAL PRIMARY KEY,
        org_id BIGINT NOT NULL REFERENCES organizations(id),
        user_id TEXT NOT NULL REFERENCES users(id),
        action TEXT NOT NULL,
        entity_type TEXT,
        entity_id BIGINT,
        metadata JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_activity_logs_org_user
        ON activity_logs(org_id, user_id, created_at);
"#;

/// Create any missing tables and seed the default organization.
pub async fn migrate() -> Result<(), DatabaseError> {
    let pool = DatabaseManager::pool().await?;
    pool.execute(SCHEMA_DDL).await?;

    let tenancy = &config::config().tenancy;
    sqlx::query("INSERT INTO organizations (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
        .bind(tenancy.default_org_id)
        .bind(&tenancy.default_org_name)
        .execute(&pool)
        .await?;

    tracing::info!("Database schema is up to date");
    Ok(())
}
