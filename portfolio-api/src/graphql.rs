/// GraphQL schema
///
/// Exposes the profile queries:
///
/// ```graphql
/// type Query {
///   profile: Profile
///   profiles: [Profile!]!
/// }
///
/// type Profile {
///   id: Int!
///   name: String!
///   title: String!
///   description: String!
/// }
/// ```
///
/// Resolvers read from the [`ProfileSource`] stored in the schema data, so the
/// same schema serves database-backed and static profiles.

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use portfolio_shared::models::profile::{Profile, ProfileSource};
use std::sync::Arc;

/// Schema type served at `/graphql`
pub type PortfolioSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// GraphQL view of a profile
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Profile")]
pub struct ProfileObject {
    pub id: i32,
    pub name: String,
    pub title: String,
    pub description: String,
}

impl From<Profile> for ProfileObject {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            title: profile.title,
            description: profile.description,
        }
    }
}

/// Root query type
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The primary profile
    async fn profile(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<ProfileObject>> {
        let source = ctx.data::<Arc<dyn ProfileSource>>()?;
        Ok(source.profile().await?.map(ProfileObject::from))
    }

    /// All profiles
    async fn profiles(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ProfileObject>> {
        let source = ctx.data::<Arc<dyn ProfileSource>>()?;
        let profiles = source.profiles().await?;
        Ok(profiles.into_iter().map(ProfileObject::from).collect())
    }
}

/// Builds the schema around a profile source
pub fn build_schema(source: Arc<dyn ProfileSource>) -> PortfolioSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(source)
        .finish()
}
