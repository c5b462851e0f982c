use anyhow::Result;
use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<()> {
    // Profiles table (one row per known user)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    // Visions table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS visions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            color TEXT,
            health_score INTEGER NOT NULL DEFAULT 50,
            archived INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_visions_user_id ON visions(user_id)",
        [],
    )?;

    // Paths table (milestones under a vision)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS paths (
            id TEXT PRIMARY KEY,
            vision_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'not-started',
            order_index INTEGER NOT NULL DEFAULT 0,
            depends_on_path_id TEXT,
            deadline TEXT,
            completed_at INTEGER,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (vision_id) REFERENCES visions(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_paths_vision_id ON paths(vision_id)",
        [],
    )?;

    // Habits table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            frequency TEXT NOT NULL,
            time_of_day TEXT NOT NULL,
            streak INTEGER NOT NULL DEFAULT 0,
            longest_streak INTEGER NOT NULL DEFAULT 0,
            paused INTEGER NOT NULL DEFAULT 0,
            pause_reason TEXT,
            linked_vision_id TEXT,
            linked_path_id TEXT,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habits_user_id ON habits(user_id)",
        [],
    )?;

    // Completion ledger: at most one row per (habit, date)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS habit_completions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id TEXT NOT NULL,
            date TEXT NOT NULL,
            completed INTEGER NOT NULL,
            note TEXT,
            created_at INTEGER NOT NULL,
            UNIQUE(habit_id, date),
            FOREIGN KEY (habit_id) REFERENCES habits(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_completions_habit_date ON habit_completions(habit_id, date)",
        [],
    )?;

    // Check-ins: at most one row per (user, date)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS check_ins (
            id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            energy INTEGER NOT NULL,
            mood TEXT NOT NULL,
            gratitude TEXT NOT NULL,
            challenge TEXT,
            created_at INTEGER NOT NULL,
            UNIQUE(user_id, date)
        )",
        [],
    )?;

    // Insights; dedup_key makes generation idempotent per user
    conn.execute(
        "CREATE TABLE IF NOT EXISTS insights (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            insight_type TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            dedup_key TEXT NOT NULL,
            dismissed INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            UNIQUE(user_id, dedup_key)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_insights_user_active ON insights(user_id, dismissed)",
        [],
    )?;

    // Lessons and per-user completion marks
    conn.execute(
        "CREATE TABLE IF NOT EXISTS lessons (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            content TEXT NOT NULL,
            key_takeaways TEXT,
            read_time INTEGER NOT NULL DEFAULT 5,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_lessons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            lesson_id TEXT NOT NULL,
            completed_at INTEGER NOT NULL,
            UNIQUE(user_id, lesson_id),
            FOREIGN KEY (lesson_id) REFERENCES lessons(id)
        )",
        [],
    )?;

    // Coach conversation, append-only per user
    conn.execute(
        "CREATE TABLE IF NOT EXISTS coach_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_coach_messages_user ON coach_messages(user_id, created_at)",
        [],
    )?;

    // Insert default lessons if they don't exist
    insert_default_lessons(conn)?;

    Ok(())
}

struct SeedLesson {
    id: &'static str,
    title: &'static str,
    category: &'static str,
    content: &'static str,
    takeaways: &'static [&'static str],
    read_time: u32,
}

const SEED_LESSONS: &[SeedLesson] = &[
    SeedLesson {
        id: "lesson-habit-stacking",
        title: "Habit Stacking",
        category: "Habits",
        content: "Attach a new habit to one you already do reliably. The existing \
                  routine becomes the cue, so the new behavior needs no willpower \
                  to start. Pick an anchor you never skip, then state the pair as \
                  a single sentence: after I pour my coffee, I write one line in \
                  my journal.",
        takeaways: &[
            "Anchor new habits to established routines",
            "State the pair as one sentence",
            "Start smaller than feels useful",
        ],
        read_time: 4,
    },
    SeedLesson {
        id: "lesson-two-minute-rule",
        title: "The Two-Minute Rule",
        category: "Habits",
        content: "Scale any habit down until it takes two minutes. Reading becomes \
                  opening the book; a workout becomes putting on shoes. Showing up \
                  is the skill being trained; volume comes later on its own.",
        takeaways: &[
            "Shrink the habit until starting is trivial",
            "Consistency before intensity",
        ],
        read_time: 3,
    },
    SeedLesson {
        id: "lesson-vision-to-path",
        title: "From Vision to Path",
        category: "Goals",
        content: "A vision without milestones stays a wish. Break each vision into \
                  paths small enough that the next action is obvious, order them, \
                  and let progress come from completing paths rather than from \
                  feeling inspired.",
        takeaways: &[
            "Milestones turn direction into progress",
            "Order paths so the next step is always visible",
        ],
        read_time: 5,
    },
    SeedLesson {
        id: "lesson-gratitude-practice",
        title: "Why Gratitude Works",
        category: "Mindfulness",
        content: "Naming one concrete thing you are grateful for shifts attention \
                  from what is missing to what is present. Specificity matters: \
                  'my sister called to check on me' does more than 'my family'.",
        takeaways: &[
            "Be specific, not general",
            "Daily repetition builds the effect",
        ],
        read_time: 3,
    },
];

fn insert_default_lessons(conn: &Connection) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    for lesson in SEED_LESSONS {
        let takeaways = serde_json::to_string(lesson.takeaways)?;

        conn.execute(
            "INSERT OR IGNORE INTO lessons (id, title, category, content, key_takeaways, read_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                lesson.id,
                lesson.title,
                lesson.category,
                lesson.content,
                takeaways,
                lesson.read_time,
                now,
            ],
        )?;
    }

    Ok(())
}
