//! SQL schema definitions.

/// Complete schema for Tessera v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Users & loyalty
-- ============================================================

-- Rows are created and mutated by external collaborators (registration,
-- loyalty awarding); the engine only reads them.
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    points INTEGER NOT NULL DEFAULT 0,
    bot_handle TEXT,
    created_at INTEGER NOT NULL
);

-- ============================================================
-- Affiliates & sales ledger
-- ============================================================

CREATE TABLE IF NOT EXISTS affiliates (
    affiliate_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(user_id),
    referral_code TEXT NOT NULL UNIQUE,
    commission_balance INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_affiliates_code ON affiliates(referral_code);

-- Sales are immutable ledger entries: inserted once, never updated or
-- deleted. Buyer ids come from the external shop and carry no FK.
CREATE TABLE IF NOT EXISTS sales (
    sale_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    amount INTEGER NOT NULL CHECK (amount > 0),
    category TEXT NOT NULL,
    commission_amount INTEGER NOT NULL,
    referral_code TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sales_referral ON sales(referral_code);

-- ============================================================
-- Lottery drawings & winners
-- ============================================================

-- seed is the hex-encoded 32-byte RNG seed, recorded for audit replay.
CREATE TABLE IF NOT EXISTS lottery_drawings (
    drawing_id TEXT PRIMARY KEY,
    seed TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS lottery_winners (
    winner_id TEXT PRIMARY KEY,
    drawing_id TEXT NOT NULL REFERENCES lottery_drawings(drawing_id),
    user_id TEXT NOT NULL,
    prize_amount INTEGER NOT NULL,
    tax_withheld INTEGER NOT NULL,
    net_amount INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_winners_drawing ON lottery_winners(drawing_id);
CREATE INDEX IF NOT EXISTS idx_winners_status ON lottery_winners(status);
"#;
