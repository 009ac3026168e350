//! Runs the star-schema INSERT statements over fixture staging rows with an
//! in-process SQL engine. Target tables carry no constraints, matching a
//! warehouse that does not enforce primary keys.

use anyhow::{Context, Result};
use datafusion::arrow::array::Int64Array;
use datafusion::prelude::SessionContext;
use etl::sql::{staging, star};

const USERS_TARGET: &str =
    "CREATE TABLE users (user_id int, first_name varchar, last_name varchar, gender varchar, level varchar)";
const SONGS_TARGET: &str =
    "CREATE TABLE songs (song_id varchar, title text, artist_id varchar, year int, duration float)";
const ARTISTS_TARGET: &str =
    "CREATE TABLE artists (artist_id varchar, name text, location text, latitude float, longitude float)";

const EVENTS: &str = r"
    INSERT INTO staging_events (userId, firstName, lastName, gender, level, page, ts) VALUES
        (7,    'Ada',   'Lovelace', 'F', 'free', 'NextSong', TIMESTAMP '2018-11-01 10:00:00'),
        (7,    'Ada',   'Lovelace', 'F', 'paid', 'Logout',   TIMESTAMP '2018-11-01 11:00:00'),
        (8,    'Alan',  'Turing',   'M', 'free', 'NextSong', TIMESTAMP '2018-11-01 10:00:00'),
        (9,    'Grace', 'Hopper',   'F', 'free', 'NextSong', TIMESTAMP '2018-11-01 09:00:00'),
        (9,    'Grace', 'Hopper',   'F', 'paid', 'NextSong', TIMESTAMP '2018-11-01 12:00:00'),
        (10,   'Edsger','Dijkstra', 'M', 'free', 'NextSong', TIMESTAMP '2018-11-01 08:00:00'),
        (10,   'Edsger','Dijkstra', 'M', 'paid', 'NextSong', TIMESTAMP '2018-11-01 08:00:00'),
        (11,   'Barbara','Liskov',  'F', 'free', 'Home',     TIMESTAMP '2018-11-01 08:00:00'),
        (NULL, NULL,    NULL,       NULL, 'free', 'Home',    TIMESTAMP '2018-11-01 07:00:00')
";

const SONGS: &str = r"
    INSERT INTO staging_songs (song_id, title, artist_id, artist_name, artist_location, artist_latitude, artist_longitude, year, duration) VALUES
        ('SO1', 'Song One',   'AR1', 'Band', 'New York',     40.7, -74.0, 2001, 200.5),
        ('SO1', 'Song One',   'AR1', 'Band', 'New York',     40.7, -74.0, 0,    200.5),
        ('SO2', 'Song Two',   'AR1', 'Band', 'New York, NY', NULL, NULL,  2003, 180.0),
        ('SO3', 'Song Three', 'AR2', 'Solo', NULL,           NULL, NULL,  1999, 150.0),
        (NULL,  'Orphan',     NULL,  'Nobody', NULL,         NULL, NULL,  2000, 100.0)
";

async fn execute(ctx: &SessionContext, sql: &str) -> Result<()> {
    ctx.sql(sql)
        .await
        .with_context(|| format!("failed to plan: {sql}"))?
        .collect()
        .await
        .with_context(|| format!("failed to run: {sql}"))?;
    Ok(())
}

async fn count(ctx: &SessionContext, sql: &str) -> Result<i64> {
    let batches = ctx.sql(sql).await?.collect().await?;
    let batch = batches.first().context("count returned no batches")?;
    let column = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .context("count did not return Int64")?;
    Ok(column.value(0))
}

async fn loaded_context() -> Result<SessionContext> {
    let ctx = SessionContext::new();
    for ddl in [
        staging::STAGING_EVENTS_CREATE,
        staging::STAGING_SONGS_CREATE,
        USERS_TARGET,
        SONGS_TARGET,
        ARTISTS_TARGET,
    ] {
        execute(&ctx, ddl).await?;
    }
    execute(&ctx, EVENTS).await?;
    execute(&ctx, SONGS).await?;
    Ok(ctx)
}

#[tokio::test]
async fn users_hold_one_row_per_listener_with_latest_level() -> Result<()> {
    let ctx = loaded_context().await?;
    execute(&ctx, star::USERS_INSERT).await?;

    let listeners = count(
        &ctx,
        "SELECT COUNT(DISTINCT userId) FROM staging_events WHERE page = 'NextSong' AND userId IS NOT NULL",
    )
    .await?;
    assert_eq!(listeners, 4);
    assert_eq!(count(&ctx, "SELECT COUNT(*) FROM users").await?, listeners);

    // Latest event is a Logout; the latest NextSong still yields the row.
    assert_eq!(
        count(&ctx, "SELECT COUNT(*) FROM users WHERE user_id = 7 AND level = 'free'").await?,
        1
    );
    assert_eq!(
        count(&ctx, "SELECT COUNT(*) FROM users WHERE user_id = 9 AND level = 'paid'").await?,
        1
    );
    // Tied timestamps still produce a single row.
    assert_eq!(count(&ctx, "SELECT COUNT(*) FROM users WHERE user_id = 10").await?, 1);
    // Never played a song.
    assert_eq!(count(&ctx, "SELECT COUNT(*) FROM users WHERE user_id = 11").await?, 0);

    Ok(())
}

#[tokio::test]
async fn artists_and_songs_have_unique_keys() -> Result<()> {
    let ctx = loaded_context().await?;
    execute(&ctx, star::SONGS_INSERT).await?;
    execute(&ctx, star::ARTISTS_INSERT).await?;

    assert_eq!(count(&ctx, "SELECT COUNT(*) FROM artists WHERE artist_id = 'AR1'").await?, 1);
    assert_eq!(count(&ctx, "SELECT COUNT(*) FROM artists").await?, 2);
    assert_eq!(
        count(
            &ctx,
            "SELECT COUNT(*) FROM (SELECT artist_id FROM artists GROUP BY artist_id HAVING COUNT(*) > 1) d",
        )
        .await?,
        0
    );

    assert_eq!(count(&ctx, "SELECT COUNT(*) FROM songs WHERE song_id = 'SO1'").await?, 1);
    assert_eq!(
        count(&ctx, "SELECT COUNT(*) FROM songs WHERE song_id = 'SO1' AND year = 2001").await?,
        1
    );
    assert_eq!(count(&ctx, "SELECT COUNT(*) FROM songs").await?, 3);

    Ok(())
}
