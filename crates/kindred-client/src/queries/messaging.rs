use async_trait::async_trait;

use kindred_shared::{Message, Principal};

use crate::backend::Backend;
use crate::cache::{MutationSpec, QueryKey, QuerySpec};
use crate::error::Result;
use crate::queries::keys;

/// Conversation with one counterpart. Polled while the conversation is open.
#[derive(Clone)]
pub struct Messages {
    pub counterpart: Principal,
}

#[async_trait]
impl QuerySpec for Messages {
    type Output = Vec<Message>;

    fn key(&self) -> QueryKey {
        keys::messages(&self.counterpart)
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Vec<Message>> {
        backend.get_messages(&self.counterpart).await
    }
}

pub struct SendMessage {
    pub to: Principal,
    pub content: String,
}

#[async_trait]
impl MutationSpec for SendMessage {
    type Output = ();

    fn name(&self) -> &'static str {
        "sendMessage"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<()> {
        backend.send_message(&self.to, self.content.clone()).await
    }

    fn invalidates(&self, _output: &()) -> Vec<QueryKey> {
        vec![keys::messages(&self.to)]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::backend::ClientHandle;
    use crate::cache::{QueryClient, QueryOptions};
    use crate::testing::{principal, MockBackend, MockConnector};

    #[tokio::test(start_paused = true)]
    async fn test_poll_reflects_messages_within_one_interval() {
        let backend = MockBackend::new();
        let handle = Arc::new(ClientHandle::new(Arc::new(MockConnector::new(backend.clone()))));
        handle.bind(None).unwrap();
        let queries = QueryClient::new(handle, QueryOptions::default());

        let bob = principal("bbbbb-bb");
        let query = Messages { counterpart: bob.clone() };
        let every = Duration::from_secs(3);
        let poll = queries.poll(query.clone(), every);

        for n in 1..=3 {
            backend.push_message(&bob, &bob, &format!("hello {n}"));
            tokio::time::sleep(every + Duration::from_millis(10)).await;
            let seen = queries.data(&query).unwrap();
            assert_eq!(seen.len(), n);
        }

        drop(poll);
        let calls = backend.calls("getMessages");
        tokio::time::sleep(every * 3).await;
        assert_eq!(backend.calls("getMessages"), calls);
    }
}
