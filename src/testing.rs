//! In-memory stand-ins for the store and object storage, used by unit and router tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::palpites::{
    repo::PalpiteRepo,
    repo_types::{NewPalpite, PalpiteRow},
};
use crate::storage::StorageClient;
use crate::users::{
    repo::{UserRepo, CPF_TAKEN, EMAIL_TAKEN},
    repo_types::{NewUser, Perfil, UserRow},
};

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (OffsetDateTime, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<Vec<UserRow>>,
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserRow>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn cpf_exists(&self, cpf: &str) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().iter().any(|u| u.cpf == cpf))
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().iter().any(|u| u.id == id))
    }

    async fn insert(&self, user: &NewUser) -> AppResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
        if rows.iter().any(|u| u.cpf == user.cpf) {
            return Err(AppError::Conflict(CPF_TAKEN.into()));
        }
        let id = rows.len() as i64 + 1;
        let now = OffsetDateTime::now_utc();
        rows.push(UserRow {
            id,
            nome: user.nome.clone(),
            email: user.email.clone(),
            password: user.password_hash.clone(),
            cpf: user.cpf.clone(),
            data_nascimento: user.data_nascimento,
            perfil: user.perfil.as_str().to_string(),
            avatar: None,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn list(&self, perfil: Option<Perfil>) -> AppResult<Vec<UserRow>> {
        let mut rows: Vec<UserRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| perfil.map_or(true, |p| u.perfil == p.as_str()))
            .cloned()
            .collect();
        newest_first(&mut rows, |u| (u.created_at, u.id));
        Ok(rows)
    }

    async fn set_avatar(&self, id: i64, avatar: Option<&str>) -> AppResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                u.avatar = avatar.map(str::to_string);
                u.updated_at = OffsetDateTime::now_utc();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

/// A store whose reads go stale between check and write, as when a concurrent
/// request commits in between: existence checks answer "absent" for email and
/// cpf but "present" for ids, while writes collide or touch nothing.
pub struct RacingUserRepo {
    insert_conflict: &'static str,
    reads: AtomicUsize,
}

impl RacingUserRepo {
    pub fn new(insert_conflict: &'static str) -> Self {
        Self {
            insert_conflict,
            reads: AtomicUsize::new(0),
        }
    }

    /// Calls to `find_by_id` so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepo for RacingUserRepo {
    async fn find_by_id(&self, _id: i64) -> AppResult<Option<UserRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> AppResult<Option<UserRow>> {
        Ok(None)
    }

    async fn email_exists(&self, _email: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn cpf_exists(&self, _cpf: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn exists(&self, _id: i64) -> AppResult<bool> {
        Ok(true)
    }

    async fn insert(&self, _user: &NewUser) -> AppResult<i64> {
        Err(AppError::Conflict(self.insert_conflict.into()))
    }

    async fn list(&self, _perfil: Option<Perfil>) -> AppResult<Vec<UserRow>> {
        Ok(Vec::new())
    }

    async fn set_avatar(&self, _id: i64, _avatar: Option<&str>) -> AppResult<u64> {
        Ok(0)
    }
}

#[derive(Default)]
pub struct MemoryPalpiteRepo {
    rows: Mutex<Vec<PalpiteRow>>,
}

#[async_trait]
impl PalpiteRepo for MemoryPalpiteRepo {
    async fn insert(&self, palpite: &NewPalpite) -> AppResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        let now = OffsetDateTime::now_utc();
        rows.push(PalpiteRow {
            id,
            user_id: palpite.user_id,
            titulo: palpite.titulo.clone(),
            img_url: palpite.img_url.clone(),
            link: palpite.link.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<PalpiteRow>> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, user_id: Option<i64>) -> AppResult<Vec<PalpiteRow>> {
        let mut rows: Vec<PalpiteRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| user_id.map_or(true, |id| p.user_id == id))
            .cloned()
            .collect();
        newest_first(&mut rows, |p| (p.created_at, p.id));
        Ok(rows)
    }
}

#[derive(Clone)]
pub struct FakeStorage;

#[async_trait]
impl StorageClient for FakeStorage {
    async fn put_object(
        &self,
        key: &str,
        _body: Bytes,
        _content_type: &str,
    ) -> anyhow::Result<String> {
        Ok(format!("https://fake.local/{key}"))
    }
}
