use super::{LikeOutcome, LikeSummary, Page, Paged, RecipeDraft, Store, StoreError};
use crate::db::DbPool;
use crate::models::{
    Author, Comment, Like, NewComment, NewLike, NewRecipe, NewSession, NewUser, Recipe, User,
};
use crate::schema::{comments, likes, recipes, sessions, users};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, exists, sql};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Bool, Text};

type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

/// [`Store`] backed by PostgreSQL through an r2d2 pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PgPooled, StoreError> {
        self.pool.get().map_err(|e| StoreError::Pool(e.to_string()))
    }
}

/// Inserts into comments/likes only fail on a foreign key when the recipe is
/// gone; the user id always comes from a live session.
fn missing_recipe(err: DieselError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            StoreError::RecipeNotFound
        }
        other => other.into(),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut conn = self.conn()?;

        let user = diesel::insert_into(users::table)
            .values(&NewUser {
                username,
                password_hash,
            })
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn()?;

        let user = users::table
            .filter(
                sql::<Bool>("LOWER(username) = LOWER(")
                    .bind::<Text, _>(username)
                    .sql(")"),
            )
            .filter(users::deleted_at.is_null())
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn create_session(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn()?;

        diesel::insert_into(sessions::table)
            .values(&NewSession {
                user_id,
                token_hash,
                expires_at,
            })
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete_expired_sessions(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            sessions::table
                .filter(sessions::user_id.eq(user_id))
                .filter(sessions::expires_at.le(now)),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }

    async fn find_session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Author>, StoreError> {
        let mut conn = self.conn()?;

        let author = sessions::table
            .inner_join(users::table)
            .filter(sessions::token_hash.eq(token_hash))
            .filter(sessions::expires_at.gt(now))
            .filter(users::deleted_at.is_null())
            .select(Author::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(author)
    }

    async fn create_recipe(&self, user_id: i32, draft: &RecipeDraft) -> Result<Recipe, StoreError> {
        let ingredients = serde_json::to_value(&draft.ingredients)?;
        let mut conn = self.conn()?;

        let recipe = diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                user_id,
                title: &draft.title,
                description: &draft.description,
                ingredients,
                instructions: &draft.instructions,
                image_urls: &draft.image_urls,
            })
            .returning(Recipe::as_returning())
            .get_result(&mut conn)?;

        Ok(recipe)
    }

    async fn get_recipe(&self, recipe_id: i32) -> Result<Option<(Recipe, Author)>, StoreError> {
        let mut conn = self.conn()?;

        let row = recipes::table
            .inner_join(users::table)
            .filter(recipes::id.eq(recipe_id))
            .select((Recipe::as_select(), Author::as_select()))
            .first(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn recipe_exists(&self, recipe_id: i32) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;

        let found = diesel::select(exists(recipes::table.find(recipe_id))).get_result(&mut conn)?;

        Ok(found)
    }

    async fn list_recipes(
        &self,
        owner: Option<i32>,
        page: Page,
    ) -> Result<Paged<(Recipe, Author)>, StoreError> {
        let mut conn = self.conn()?;

        let mut count_query = recipes::table.select(count_star()).into_boxed();
        let mut query = recipes::table
            .inner_join(users::table)
            .select((Recipe::as_select(), Author::as_select()))
            .into_boxed();

        if let Some(owner) = owner {
            count_query = count_query.filter(recipes::user_id.eq(owner));
            query = query.filter(recipes::user_id.eq(owner));
        }

        let total: i64 = count_query.get_result(&mut conn)?;
        let items = query
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .limit(page.limit)
            .offset(page.offset)
            .load(&mut conn)?;

        Ok(Paged { items, total })
    }

    async fn create_comment(
        &self,
        user_id: i32,
        recipe_id: i32,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let mut conn = self.conn()?;

        diesel::insert_into(comments::table)
            .values(&NewComment {
                content,
                user_id,
                recipe_id,
            })
            .returning(Comment::as_returning())
            .get_result(&mut conn)
            .map_err(missing_recipe)
    }

    async fn list_comments(
        &self,
        recipe_id: i32,
        page: Page,
    ) -> Result<Paged<(Comment, Author)>, StoreError> {
        let mut conn = self.conn()?;

        let total: i64 = comments::table
            .filter(comments::recipe_id.eq(recipe_id))
            .count()
            .get_result(&mut conn)?;

        let items = comments::table
            .inner_join(users::table)
            .filter(comments::recipe_id.eq(recipe_id))
            .order((comments::created_at.asc(), comments::id.asc()))
            .limit(page.limit)
            .offset(page.offset)
            .select((Comment::as_select(), Author::as_select()))
            .load(&mut conn)?;

        Ok(Paged { items, total })
    }

    async fn add_like(&self, user_id: i32, recipe_id: i32) -> Result<LikeOutcome, StoreError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let inserted: Option<Like> = diesel::insert_into(likes::table)
                .values(&NewLike { user_id, recipe_id })
                .on_conflict((likes::user_id, likes::recipe_id))
                .do_nothing()
                .returning(Like::as_returning())
                .get_result(conn)
                .optional()
                .map_err(missing_recipe)?;

            if let Some(like) = inserted {
                return Ok(LikeOutcome::Created(like));
            }

            let existing = likes::table
                .filter(likes::user_id.eq(user_id))
                .filter(likes::recipe_id.eq(recipe_id))
                .select(Like::as_select())
                .first(conn)?;

            Ok(LikeOutcome::AlreadyLiked(existing))
        })
    }

    async fn like_summary(
        &self,
        recipe_id: i32,
        viewer: Option<i32>,
    ) -> Result<LikeSummary, StoreError> {
        let mut conn = self.conn()?;

        let likes: i64 = likes::table
            .filter(likes::recipe_id.eq(recipe_id))
            .count()
            .get_result(&mut conn)?;

        let has_liked = match viewer {
            Some(user_id) => diesel::select(exists(
                likes::table
                    .filter(likes::recipe_id.eq(recipe_id))
                    .filter(likes::user_id.eq(user_id)),
            ))
            .get_result(&mut conn)?,
            None => false,
        };

        Ok(LikeSummary { likes, has_liked })
    }
}
