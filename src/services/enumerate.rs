// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paged enumeration of every user held by the identity provider.
//!
//! Pages are fetched lazily as the stream is polled, following the
//! provider's continuation token until none is returned. A user ID seen on
//! an earlier page is dropped if it shows up again (best-effort dedup; the
//! provider offers no snapshot isolation). The first failed page ends the
//! stream with that error.

use crate::error::{AppError, Result};
use crate::models::{IdentityRecord, UserPage};
use crate::services::identity::IdentityProvider;
use futures_util::{stream, Stream, TryStreamExt};
use std::collections::HashSet;

enum Cursor {
    First,
    Next(String),
    Done,
}

/// Stream of pages, each already stripped of previously seen users.
pub fn user_pages<'a, P>(
    provider: &'a P,
    page_size: u32,
) -> impl Stream<Item = Result<Vec<IdentityRecord>>> + 'a
where
    P: IdentityProvider + ?Sized,
{
    stream::try_unfold(
        (Cursor::First, HashSet::<String>::new()),
        move |(cursor, mut seen)| async move {
            let token = match cursor {
                Cursor::Done => return Ok::<_, AppError>(None),
                Cursor::First => None,
                Cursor::Next(token) => Some(token),
            };

            let UserPage {
                users,
                next_page_token,
            } = provider.list_users(page_size, token.as_deref()).await?;

            let fetched = users.len();
            let users: Vec<IdentityRecord> = users
                .into_iter()
                .filter(|user| seen.insert(user.uid.clone()))
                .collect();

            if users.len() < fetched {
                tracing::debug!(
                    duplicates = fetched - users.len(),
                    "Dropped users already seen on an earlier page"
                );
            }

            let next = match next_page_token {
                Some(token) if !token.is_empty() => Cursor::Next(token),
                _ => Cursor::Done,
            };

            Ok(Some((users, (next, seen))))
        },
    )
}

/// Stream of every user, one at a time.
pub fn all_users<'a, P>(
    provider: &'a P,
    page_size: u32,
) -> impl Stream<Item = Result<IdentityRecord>> + 'a
where
    P: IdentityProvider + ?Sized,
{
    user_pages(provider, page_size)
        .map_ok(|users| stream::iter(users.into_iter().map(Ok::<_, AppError>)))
        .try_flatten()
}

/// Collect every user, or the first page error.
pub async fn collect_users<P>(provider: &P, page_size: u32) -> Result<Vec<IdentityRecord>>
where
    P: IdentityProvider + ?Sized,
{
    let users: Vec<IdentityRecord> = all_users(provider, page_size).try_collect().await?;
    tracing::debug!(count = users.len(), "Enumerated identity provider users");
    Ok(users)
}
