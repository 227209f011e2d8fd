/// Generate client methods with oneshot channel boilerplate and automatic
/// tracing. Parameter names must match the request variant's field names.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> std::result::Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Service closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Service dropped".to_string()))?
            }
        }
    };
}

/// Generate the shutdown method for a client whose request enum has a
/// `Shutdown` variant.
macro_rules! client_shutdown {
    ($client:ty => $request:ident) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn shutdown(&self) -> std::result::Result<(), String> {
                tracing::debug!("Sending shutdown request");
                self.sender
                    .send($request::Shutdown)
                    .await
                    .map_err(|e| e.to_string())
            }
        }
    };
}

pub(crate) use client_method;
pub(crate) use client_shutdown;
