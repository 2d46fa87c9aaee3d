use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::loader::LoaderKind;
use crate::schema::SchemaSource;
use crate::validator::ValidatedArguments;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;

/// Wrap a typed handler so it accepts [`ValidatedArguments`].
///
/// The arguments are unpacked into `T` by field name. A mismatch means the
/// descriptor and the struct disagree, which is a server fault, so it is
/// answered with 500 rather than blamed on the caller.
pub fn typed_handler<T, F>(
    name: &'static str,
    handler: F,
) -> impl Fn(ValidatedArguments) -> HandlerResponse + Send + Sync + 'static
where
    T: DeserializeOwned + 'static,
    F: Fn(T) -> HandlerResponse + Send + Sync + 'static,
{
    move |args: ValidatedArguments| match args.into_typed::<T>() {
        Ok(typed) => handler(typed),
        Err(err) => {
            error!(
                handler_name = name,
                target_type = std::any::type_name::<T>(),
                error = %err,
                "Validated arguments do not fit handler signature"
            );
            HandlerResponse::json(
                500,
                json!({
                    "error": "Handler argument mismatch",
                    "message": err.to_string(),
                }),
            )
        }
    }
}

impl Dispatcher {
    /// Bind a handler that takes a deserializable keyword struct instead of
    /// raw [`ValidatedArguments`].
    pub fn bind_typed<T, F>(
        &mut self,
        resource: &'static str,
        method: Method,
        loader: LoaderKind,
        schema: impl Into<SchemaSource>,
        handler: F,
    ) where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> HandlerResponse + Send + Sync + 'static,
    {
        self.bind(resource, method, loader, schema, typed_handler(resource, handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::RawRequest;
    use crate::schema::{FieldSpec, FieldType, SchemaDescriptor};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TaskArgs {
        task_id: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct WrongArgs {
        task_id: String,
    }

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::builder("AsyncTasks")
            .field(FieldSpec::new("task_id", FieldType::Integer).nullable())
            .build()
            .unwrap()
    }

    #[test]
    fn typed_handler_receives_struct() {
        let mut d = Dispatcher::new();
        d.bind_typed("tasks", Method::GET, LoaderKind::Path, schema(), |args: TaskArgs| {
            HandlerResponse::ok(json!({ "task": args.task_id }))
        });
        let req = RawRequest::new(Method::GET, "/tasks/7").with_path_param("task_id", "7");
        let resp = d.dispatch("tasks", &req).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["task"], 7);
    }

    #[test]
    fn mismatched_struct_is_server_error() {
        let mut d = Dispatcher::new();
        d.bind_typed("tasks", Method::GET, LoaderKind::Path, schema(), |_: WrongArgs| {
            HandlerResponse::ok(json!({}))
        });
        let req = RawRequest::new(Method::GET, "/tasks/7").with_path_param("task_id", "7");
        let resp = d.dispatch("tasks", &req).unwrap();
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], "Handler argument mismatch");
    }
}
