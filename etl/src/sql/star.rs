// Star schema: `songplays` fact table plus four dimensions, filled from the
// staging tables with INSERT ... SELECT.

pub const SONGPLAYS_CREATE: &str = r"
    CREATE TABLE songplays (
        songplay_id     int IDENTITY(0,1) PRIMARY KEY,
        start_time      timestamp REFERENCES time(start_time),
        user_id         int REFERENCES users(user_id),
        level           varchar NOT NULL,
        song_id         varchar REFERENCES songs(song_id),
        artist_id       varchar REFERENCES artists(artist_id),
        session_id      int NOT NULL,
        location        text,
        user_agent      varchar
    )
";

pub const USERS_CREATE: &str = r"
    CREATE TABLE users (
        user_id         int PRIMARY KEY,
        first_name      varchar NOT NULL,
        last_name       varchar NOT NULL,
        gender          varchar,
        level           varchar NOT NULL
    )
";

pub const SONGS_CREATE: &str = r"
    CREATE TABLE songs (
        song_id         varchar PRIMARY KEY,
        title           text NOT NULL,
        artist_id       varchar REFERENCES artists(artist_id),
        year            int,
        duration        float NOT NULL
    )
";

pub const ARTISTS_CREATE: &str = r"
    CREATE TABLE artists (
        artist_id       varchar PRIMARY KEY,
        name            text NOT NULL,
        location        text,
        latitude        float,
        longitude       float
    )
";

pub const TIME_CREATE: &str = r"
    CREATE TABLE time (
        start_time      timestamp PRIMARY KEY,
        hour            int,
        day             int,
        week            int,
        month           int,
        year            int,
        weekday         int
    )
";

/// One row per `NextSong` event with a timestamp. Song and artist ids come
/// from an inner match on title, artist name and duration.
pub const SONGPLAYS_INSERT: &str = r"
    INSERT INTO songplays (
        start_time,
        user_id,
        level,
        song_id,
        artist_id,
        session_id,
        location,
        user_agent
    )
    SELECT DISTINCT
        e.ts,
        e.userId,
        e.level,
        s.song_id,
        s.artist_id,
        e.sessionId,
        e.location,
        e.userAgent
    FROM staging_events e
    JOIN staging_songs s
        ON (e.song = s.title AND e.artist = s.artist_name AND e.length = s.duration)
    WHERE e.page = 'NextSong'
        AND e.ts IS NOT NULL
";

/// One row per user, taken from their latest `NextSong` event so `level`
/// reflects the most recent subscription tier. Timestamp ties resolve to a
/// single row.
pub const USERS_INSERT: &str = r"
    INSERT INTO users (
        user_id,
        first_name,
        last_name,
        gender,
        level
    )
    SELECT
        userId,
        firstName,
        lastName,
        gender,
        level
    FROM (
        SELECT
            userId,
            firstName,
            lastName,
            gender,
            level,
            ROW_NUMBER() OVER (
                PARTITION BY userId
                ORDER BY ts DESC, level DESC
            ) AS row_num
        FROM staging_events
        WHERE userId IS NOT NULL
            AND page = 'NextSong'
    ) latest
    WHERE row_num = 1
";

// The warehouse does not enforce primary keys, so songs and artists keep one
// row per key even when song files disagree on the other columns.

pub const SONGS_INSERT: &str = r"
    INSERT INTO songs (
        song_id,
        title,
        artist_id,
        year,
        duration
    )
    SELECT
        song_id,
        title,
        artist_id,
        year,
        duration
    FROM (
        SELECT
            song_id,
            title,
            artist_id,
            year,
            duration,
            ROW_NUMBER() OVER (
                PARTITION BY song_id
                ORDER BY year DESC, title, duration
            ) AS row_num
        FROM staging_songs
        WHERE song_id IS NOT NULL
    ) ranked
    WHERE row_num = 1
";

pub const ARTISTS_INSERT: &str = r"
    INSERT INTO artists (
        artist_id,
        name,
        location,
        latitude,
        longitude
    )
    SELECT
        artist_id,
        artist_name,
        artist_location,
        artist_latitude,
        artist_longitude
    FROM (
        SELECT
            artist_id,
            artist_name,
            artist_location,
            artist_latitude,
            artist_longitude,
            ROW_NUMBER() OVER (
                PARTITION BY artist_id
                ORDER BY artist_name, artist_location
            ) AS row_num
        FROM staging_songs
        WHERE artist_id IS NOT NULL
    ) ranked
    WHERE row_num = 1
";

pub const TIME_INSERT: &str = r"
    INSERT INTO time (
        start_time,
        hour,
        day,
        week,
        month,
        year,
        weekday
    )
    SELECT DISTINCT
        ts,
        date_part(h, ts),
        date_part(d, ts),
        date_part(w, ts),
        date_part(mon, ts),
        date_part(y, ts),
        date_part(dow, ts)
    FROM staging_events
    WHERE ts IS NOT NULL
";
