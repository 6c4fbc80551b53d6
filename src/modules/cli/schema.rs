//! Demo schema served by `trellis run`

use async_graphql::{Context, EmptySubscription, Json, Object, Schema};
use trellis_runtime::RequestContext;
use trellis_types::{UploadDescriptor, UploadedFiles};

/// Schema type of the demo service
pub type DemoSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Greets `name`, or the world
    async fn hello(&self, name: Option<String>) -> String {
        format!("Hello, {}!", name.as_deref().unwrap_or("world"))
    }

    /// The `user` value of the request context, if any
    async fn viewer(&self, ctx: &Context<'_>) -> Option<String> {
        ctx.data::<RequestContext>()
            .ok()
            .and_then(|request| request.context.as_ref())
            .and_then(|context| context.get("user"))
            .and_then(|user| user.as_str())
            .map(str::to_string)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Returns `message` unchanged
    async fn echo(&self, message: String) -> String {
        message
    }

    /// Size in bytes of an uploaded file
    async fn file_size(&self, ctx: &Context<'_>, file: Json<UploadDescriptor>) -> Option<usize> {
        let files = ctx.data::<UploadedFiles>().ok()?;
        files.get(&file.upload).map(|f| f.data.len())
    }
}

pub fn demo_schema() -> DemoSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}
