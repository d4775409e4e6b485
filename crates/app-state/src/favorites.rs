//! Favorites
//!
//! Four independent collections (matches, players, teams, competitions),
//! each persisted as a JSON array under its own key. Mutations are
//! write-through and strict: the full new collection is persisted first and
//! only published in memory once the write succeeded, so a failed save leaves
//! the in-memory collection untouched and the error reaches the caller.
//!
//! Mutations of one category are serialized by a per-category gate, which
//! means every add/remove/toggle decides from the freshest collection.
//! Reads never wait on I/O.

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use storage::{keys, KeyValueStore, KeyValueStoreExt, StorageError};
use thiserror::Error;
use tokio::sync::Mutex;

/// Favorites errors
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// Persisting the collection failed
    #[error("Failed to save favorites: {0}")]
    Storage(#[from] StorageError),

    /// Encoding the collection failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for favorites operations
pub type Result<T> = std::result::Result<T, FavoritesError>;

/// Extra attributes carried alongside the known ones
pub type Extra = Map<String, Value>;

/// Item identity, either a string or a number
///
/// Two ids are equal when their string forms are equal, so `7` and `"7"`
/// name the same item. Any JSON number is accepted, including floats and
/// integers beyond `i64`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Numeric id
    Number(Number),
    /// String id
    Text(String),
}

impl ItemId {
    /// String form used for identity comparison
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ItemId::Number(a), ItemId::Number(b)) => a == b,
            (ItemId::Text(a), ItemId::Text(b)) => a == b,
            _ => self.as_key() == other.as_key(),
        }
    }
}

impl Eq for ItemId {}

impl std::hash::Hash for ItemId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

macro_rules! item_id_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ItemId {
                fn from(n: $ty) -> Self {
                    ItemId::Number(n.into())
                }
            }
        )*
    };
}

item_id_from_integer!(i32, i64, u32, u64, usize);

impl From<Number> for ItemId {
    fn from(n: Number) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Text(s)
    }
}

impl From<&ItemId> for ItemId {
    fn from(id: &ItemId) -> Self {
        id.clone()
    }
}

/// Favorites category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Matches
    Matches,
    /// Players
    Players,
    /// Teams
    Teams,
    /// Competitions
    Competitions,
}

impl Category {
    /// Every category
    pub const ALL: [Category; 4] =
        [Category::Matches, Category::Players, Category::Teams, Category::Competitions];

    /// Key the category is persisted under
    pub fn storage_key(&self) -> &'static str {
        match self {
            Category::Matches => keys::FAV_MATCHES,
            Category::Players => keys::FAV_PLAYERS,
            Category::Teams => keys::FAV_TEAMS,
            Category::Competitions => keys::FAV_COMPETITIONS,
        }
    }

    fn index(&self) -> usize {
        match self {
            Category::Matches => 0,
            Category::Players => 1,
            Category::Teams => 2,
            Category::Competitions => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Matches => "matches",
            Category::Players => "players",
            Category::Teams => "teams",
            Category::Competitions => "competitions",
        };
        f.write_str(name)
    }
}

/// Favorite match attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Home side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team: Option<String>,

    /// Away side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team: Option<String>,

    /// Competition name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<String>,

    /// Kickoff time as sent by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kickoff: Option<String>,

    /// Any other attributes
    #[serde(flatten)]
    pub extra: Extra,
}

/// Favorite player attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    /// Player name
    #[serde(default)]
    pub name: String,

    /// Current club
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    /// Playing position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    /// Any other attributes
    #[serde(flatten)]
    pub extra: Extra,
}

/// Favorite team attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    /// Team name
    #[serde(default)]
    pub name: String,

    /// Crest URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Country
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Any other attributes
    #[serde(flatten)]
    pub extra: Extra,
}

/// Favorite competition attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionInfo {
    /// Competition name
    #[serde(default)]
    pub name: String,

    /// Country or region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Logo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Any other attributes
    #[serde(flatten)]
    pub extra: Extra,
}

/// A favorited item: identity plus category-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem<A> {
    /// Item identity
    pub id: ItemId,

    /// Category attributes
    #[serde(flatten)]
    pub attributes: A,
}

impl<A> FavoriteItem<A> {
    /// Create an item
    pub fn new(id: impl Into<ItemId>, attributes: A) -> Self {
        Self { id: id.into(), attributes }
    }
}

/// A favorite of any category
#[derive(Debug, Clone, PartialEq)]
pub enum Favorite {
    /// Favorite match
    Match(FavoriteItem<MatchInfo>),
    /// Favorite player
    Player(FavoriteItem<PlayerInfo>),
    /// Favorite team
    Team(FavoriteItem<TeamInfo>),
    /// Favorite competition
    Competition(FavoriteItem<CompetitionInfo>),
}

impl Favorite {
    /// Category of this favorite
    pub fn category(&self) -> Category {
        match self {
            Favorite::Match(_) => Category::Matches,
            Favorite::Player(_) => Category::Players,
            Favorite::Team(_) => Category::Teams,
            Favorite::Competition(_) => Category::Competitions,
        }
    }

    /// Identity of this favorite
    pub fn id(&self) -> &ItemId {
        match self {
            Favorite::Match(item) => &item.id,
            Favorite::Player(item) => &item.id,
            Favorite::Team(item) => &item.id,
            Favorite::Competition(item) => &item.id,
        }
    }
}

/// In-memory collections
#[derive(Debug, Clone, Default)]
pub struct Collections {
    matches: Vec<FavoriteItem<MatchInfo>>,
    players: Vec<FavoriteItem<PlayerInfo>>,
    teams: Vec<FavoriteItem<TeamInfo>>,
    competitions: Vec<FavoriteItem<CompetitionInfo>>,
}

/// Attribute schema bound to one category
pub trait FavoriteKind: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Category the schema belongs to
    const CATEGORY: Category;

    /// Collection for this category
    fn slot(collections: &Collections) -> &Vec<FavoriteItem<Self>>;

    /// Mutable collection for this category
    fn slot_mut(collections: &mut Collections) -> &mut Vec<FavoriteItem<Self>>;

    /// Wrap into the tagged union
    fn wrap(item: FavoriteItem<Self>) -> Favorite;
}

macro_rules! favorite_kind {
    ($ty:ty, $category:expr, $field:ident, $variant:ident) => {
        impl FavoriteKind for $ty {
            const CATEGORY: Category = $category;

            fn slot(collections: &Collections) -> &Vec<FavoriteItem<Self>> {
                &collections.$field
            }

            fn slot_mut(collections: &mut Collections) -> &mut Vec<FavoriteItem<Self>> {
                &mut collections.$field
            }

            fn wrap(item: FavoriteItem<Self>) -> Favorite {
                Favorite::$variant(item)
            }
        }
    };
}

favorite_kind!(MatchInfo, Category::Matches, matches, Match);
favorite_kind!(PlayerInfo, Category::Players, players, Player);
favorite_kind!(TeamInfo, Category::Teams, teams, Team);
favorite_kind!(CompetitionInfo, Category::Competitions, competitions, Competition);

/// Owner of the four favorites collections
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    collections: RwLock<Collections>,
    gates: [Mutex<()>; 4],
}

impl FavoritesStore {
    /// Load all four collections concurrently
    ///
    /// A category whose read or decode fails starts empty; the others are
    /// unaffected.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let (matches, players, teams, competitions) = tokio::join!(
            load_category::<MatchInfo>(store.as_ref()),
            load_category::<PlayerInfo>(store.as_ref()),
            load_category::<TeamInfo>(store.as_ref()),
            load_category::<CompetitionInfo>(store.as_ref()),
        );

        Self {
            store,
            collections: RwLock::new(Collections { matches, players, teams, competitions }),
            gates: Default::default(),
        }
    }

    fn gate(&self, category: Category) -> &Mutex<()> {
        &self.gates[category.index()]
    }

    /// Whether `id` is in the category's collection
    pub fn is_favorite(&self, category: Category, id: impl Into<ItemId>) -> bool {
        let id = id.into();
        match category {
            Category::Matches => self.contains::<MatchInfo>(&id),
            Category::Players => self.contains::<PlayerInfo>(&id),
            Category::Teams => self.contains::<TeamInfo>(&id),
            Category::Competitions => self.contains::<CompetitionInfo>(&id),
        }
    }

    /// Add a favorite; returns `false` without writing if the id is present
    pub async fn add_favorite(&self, favorite: Favorite) -> Result<bool> {
        match favorite {
            Favorite::Match(item) => self.add(item).await,
            Favorite::Player(item) => self.add(item).await,
            Favorite::Team(item) => self.add(item).await,
            Favorite::Competition(item) => self.add(item).await,
        }
    }

    /// Remove a favorite; returns `false` without writing if the id is absent
    pub async fn remove_favorite(&self, category: Category, id: impl Into<ItemId>) -> Result<bool> {
        let id = id.into();
        match category {
            Category::Matches => self.remove::<MatchInfo>(&id).await,
            Category::Players => self.remove::<PlayerInfo>(&id).await,
            Category::Teams => self.remove::<TeamInfo>(&id).await,
            Category::Competitions => self.remove::<CompetitionInfo>(&id).await,
        }
    }

    /// Add the favorite if absent, remove it if present
    ///
    /// Returns the new membership.
    pub async fn toggle_favorite(&self, favorite: Favorite) -> Result<bool> {
        match favorite {
            Favorite::Match(item) => self.toggle(item).await,
            Favorite::Player(item) => self.toggle(item).await,
            Favorite::Team(item) => self.toggle(item).await,
            Favorite::Competition(item) => self.toggle(item).await,
        }
    }

    /// Current favorites of a category
    pub fn get_favorites(&self, category: Category) -> Vec<Favorite> {
        match category {
            Category::Matches => self.wrapped::<MatchInfo>(),
            Category::Players => self.wrapped::<PlayerInfo>(),
            Category::Teams => self.wrapped::<TeamInfo>(),
            Category::Competitions => self.wrapped::<CompetitionInfo>(),
        }
    }

    /// Current favorites of one category, typed
    pub fn favorites<K: FavoriteKind>(&self) -> Vec<FavoriteItem<K>> {
        K::slot(&self.collections.read()).clone()
    }

    /// Number of favorites in a category
    pub fn count(&self, category: Category) -> usize {
        let collections = self.collections.read();
        match category {
            Category::Matches => collections.matches.len(),
            Category::Players => collections.players.len(),
            Category::Teams => collections.teams.len(),
            Category::Competitions => collections.competitions.len(),
        }
    }

    /// Empty a category
    pub async fn clear_category(&self, category: Category) -> Result<()> {
        match category {
            Category::Matches => self.clear::<MatchInfo>().await,
            Category::Players => self.clear::<PlayerInfo>().await,
            Category::Teams => self.clear::<TeamInfo>().await,
            Category::Competitions => self.clear::<CompetitionInfo>().await,
        }
    }

    fn contains<K: FavoriteKind>(&self, id: &ItemId) -> bool {
        K::slot(&self.collections.read()).iter().any(|item| &item.id == id)
    }

    fn wrapped<K: FavoriteKind>(&self) -> Vec<Favorite> {
        self.favorites::<K>().into_iter().map(K::wrap).collect()
    }

    async fn add<K: FavoriteKind>(&self, item: FavoriteItem<K>) -> Result<bool> {
        let _gate = self.gate(K::CATEGORY).lock().await;
        self.add_locked(item).await
    }

    async fn remove<K: FavoriteKind>(&self, id: &ItemId) -> Result<bool> {
        let _gate = self.gate(K::CATEGORY).lock().await;
        self.remove_locked::<K>(id).await
    }

    async fn toggle<K: FavoriteKind>(&self, item: FavoriteItem<K>) -> Result<bool> {
        let _gate = self.gate(K::CATEGORY).lock().await;
        if self.contains::<K>(&item.id) {
            self.remove_locked::<K>(&item.id).await?;
            Ok(false)
        } else {
            self.add_locked(item).await?;
            Ok(true)
        }
    }

    async fn clear<K: FavoriteKind>(&self) -> Result<()> {
        let _gate = self.gate(K::CATEGORY).lock().await;
        self.commit::<K>(Vec::new()).await
    }

    // Callers hold the category gate for the remaining helpers

    async fn add_locked<K: FavoriteKind>(&self, item: FavoriteItem<K>) -> Result<bool> {
        let mut next = self.favorites::<K>();
        if next.iter().any(|existing| existing.id == item.id) {
            return Ok(false);
        }
        next.push(item);
        self.commit(next).await?;
        Ok(true)
    }

    async fn remove_locked<K: FavoriteKind>(&self, id: &ItemId) -> Result<bool> {
        let current = self.favorites::<K>();
        let next: Vec<_> = current.iter().filter(|item| &item.id != id).cloned().collect();
        if next.len() == current.len() {
            return Ok(false);
        }
        self.commit(next).await?;
        Ok(true)
    }

    /// Persist, then publish
    async fn commit<K: FavoriteKind>(&self, next: Vec<FavoriteItem<K>>) -> Result<()> {
        let category = K::CATEGORY;
        let raw = serde_json::to_string(&next)?;

        if let Err(e) = self.store.set(category.storage_key(), &raw).await {
            tracing::warn!(%category, "failed to save favorites: {}", e);
            return Err(e.into());
        }

        *K::slot_mut(&mut self.collections.write()) = next;
        tracing::debug!(%category, "favorites saved");
        Ok(())
    }
}

async fn load_category<K: FavoriteKind>(store: &dyn KeyValueStore) -> Vec<FavoriteItem<K>> {
    let category = K::CATEGORY;
    let raw = match store.get_json::<Vec<Value>>(category.storage_key()).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(%category, "failed to load favorites, starting empty: {}", e);
            return Vec::new();
        }
    };

    // One unreadable entry must not take the rest of the category with it
    let items = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<FavoriteItem<K>>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(%category, "skipping unreadable favorite: {}", e);
                None
            }
        })
        .collect();

    dedupe(items)
}

/// Keep the first occurrence of each id
fn dedupe<K>(items: Vec<FavoriteItem<K>>) -> Vec<FavoriteItem<K>> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.id.as_key())).collect()
}
