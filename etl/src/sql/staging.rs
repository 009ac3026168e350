use common::config::Settings;

use super::quote_literal;

pub const STAGING_EVENTS_CREATE: &str = r"
    CREATE TABLE staging_events (
        artist          text,
        auth            varchar,
        firstName       varchar,
        gender          varchar,
        itemInSession   int,
        lastName        varchar,
        length          float,
        level           varchar,
        location        text,
        method          varchar,
        page            varchar,
        registration    varchar,
        sessionId       int,
        song            text,
        status          int,
        ts              timestamp,
        userAgent       varchar,
        userId          int
    )
";

pub const STAGING_SONGS_CREATE: &str = r"
    CREATE TABLE staging_songs (
        num_songs           int,
        artist_id           varchar,
        artist_latitude     float,
        artist_longitude    float,
        artist_location     text,
        artist_name         text,
        song_id             varchar,
        title               text,
        duration            float,
        year                int
    )
";

/// Event logs need an explicit JSONPaths file; `ts` arrives as epoch
/// milliseconds.
pub fn staging_events_copy(settings: &Settings) -> String {
    format!(
        r"
    COPY staging_events FROM {}
        iam_role {}
        region {}
        format as json {}
        timeformat 'epochmillisecs'
",
        quote_literal(&settings.s3.log_data),
        quote_literal(&settings.iam_role.arn),
        quote_literal(&settings.s3.region),
        quote_literal(&settings.s3.log_jsonpath),
    )
}

pub fn staging_songs_copy(settings: &Settings) -> String {
    format!(
        r"
    COPY staging_songs FROM {}
        iam_role {}
        region {}
        json 'auto'
",
        quote_literal(&settings.s3.song_data),
        quote_literal(&settings.iam_role.arn),
        quote_literal(&settings.s3.region),
    )
}
