//! [`KvClient`] over a live etcd cluster.
//!
//! Enabled by the `etcd` feature. Requests map one to one onto the etcd v3
//! API; nothing is retried and every transport failure surfaces as
//! [`ClientError::Unavailable`].
//!
//! Each watch is served by a background task that forwards etcd watch
//! messages into the [`WatchStream`]. The task exits, canceling the etcd
//! watch, once the stream is dropped or etcd ends the watch.

use crate::client::{KvClient, WatchItem, WatchStream};
use crate::error::ClientError;
use crate::types::{
    Compare, CompareOp, CompareTarget, DeleteResponse, Event, EventType, GetResponse, KeyValue,
    PutResponse, ResponseHeader, TxnOp, TxnOpResponse, TxnRequest, TxnResponse, WatchResponse,
};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

pub use etcd_client::{Client, ConnectOptions};

/// Connect to the cluster at `endpoints`.
pub async fn connect<S: AsRef<str>>(endpoints: &[S]) -> Result<Client, ClientError> {
    let endpoints: Vec<&str> = endpoints.iter().map(AsRef::as_ref).collect();
    debug!(?endpoints, "connecting to etcd");
    Client::connect(endpoints, None).await.map_err(unavailable)
}

fn unavailable(err: etcd_client::Error) -> ClientError {
    ClientError::Unavailable {
        reason: err.to_string(),
    }
}

fn text(bytes: &[u8]) -> Result<String, ClientError> {
    String::from_utf8(bytes.to_vec()).map_err(|err| ClientError::InvalidRequest {
        reason: format!("non UTF-8 data in store: {}", err),
    })
}

fn header(header: Option<&etcd_client::ResponseHeader>) -> ResponseHeader {
    ResponseHeader {
        revision: header.map(|h| h.revision()).unwrap_or_default(),
    }
}

fn key_value(kv: &etcd_client::KeyValue) -> Result<KeyValue, ClientError> {
    Ok(KeyValue {
        key: text(kv.key())?,
        value: text(kv.value())?,
        create_revision: kv.create_revision(),
        mod_revision: kv.mod_revision(),
        version: kv.version(),
    })
}

fn get_response(resp: &etcd_client::GetResponse) -> Result<GetResponse, ClientError> {
    Ok(GetResponse {
        header: header(resp.header()),
        kvs: resp.kvs().iter().map(key_value).collect::<Result<_, _>>()?,
    })
}

fn put_response(resp: &etcd_client::PutResponse) -> PutResponse {
    PutResponse {
        header: header(resp.header()),
    }
}

fn delete_response(resp: &etcd_client::DeleteResponse) -> DeleteResponse {
    DeleteResponse {
        header: header(resp.header()),
        deleted: resp.deleted(),
    }
}

fn compare(cmp: Compare) -> etcd_client::Compare {
    let op = match cmp.op {
        CompareOp::Equal => etcd_client::CompareOp::Equal,
        CompareOp::NotEqual => etcd_client::CompareOp::NotEqual,
        CompareOp::Greater => etcd_client::CompareOp::Greater,
        CompareOp::Less => etcd_client::CompareOp::Less,
    };
    match cmp.target {
        CompareTarget::CreateRevision => {
            etcd_client::Compare::create_revision(cmp.key, op, cmp.operand)
        }
        CompareTarget::ModRevision => etcd_client::Compare::mod_revision(cmp.key, op, cmp.operand),
    }
}

fn txn_op(op: TxnOp) -> etcd_client::TxnOp {
    match op {
        TxnOp::Get { key } => etcd_client::TxnOp::get(key, None),
        TxnOp::Put { key, value } => etcd_client::TxnOp::put(key, value, None),
        TxnOp::Delete { key } => etcd_client::TxnOp::delete(key, None),
    }
}

fn txn(txn: TxnRequest) -> etcd_client::Txn {
    etcd_client::Txn::new()
        .when(txn.compare.into_iter().map(compare).collect::<Vec<_>>())
        .and_then(txn.success.into_iter().map(txn_op).collect::<Vec<_>>())
        .or_else(txn.failure.into_iter().map(txn_op).collect::<Vec<_>>())
}

fn txn_op_response(resp: etcd_client::TxnOpResponse) -> Result<TxnOpResponse, ClientError> {
    match resp {
        etcd_client::TxnOpResponse::Get(get) => Ok(TxnOpResponse::Get(get_response(&get)?)),
        etcd_client::TxnOpResponse::Put(put) => Ok(TxnOpResponse::Put(put_response(&put))),
        etcd_client::TxnOpResponse::Delete(delete) => {
            Ok(TxnOpResponse::Delete(delete_response(&delete)))
        }
        etcd_client::TxnOpResponse::Txn(_) => Err(ClientError::InvalidRequest {
            reason: "nested transaction in response".to_string(),
        }),
    }
}

fn event(event: &etcd_client::Event) -> Result<Option<Event>, ClientError> {
    let Some(kv) = event.kv() else {
        return Ok(None);
    };
    let kind = match event.event_type() {
        etcd_client::EventType::Put => EventType::Put,
        etcd_client::EventType::Delete => EventType::Delete,
    };
    Ok(Some(Event {
        kind,
        kv: key_value(kv)?,
    }))
}

/// Translate one etcd watch message. `Ok(None)` for messages carrying no
/// events (creation acks, progress notifications).
fn watch_response(
    resp: &etcd_client::WatchResponse,
) -> Result<Option<WatchResponse>, ClientError> {
    if resp.compact_revision() > 0 {
        return Err(ClientError::Compacted {
            revision: resp.compact_revision(),
        });
    }
    if resp.canceled() {
        return Err(ClientError::WatchCanceled {
            reason: resp.cancel_reason().to_string(),
        });
    }
    let mut events = Vec::with_capacity(resp.events().len());
    for raw in resp.events() {
        if let Some(event) = event(raw)? {
            events.push(event);
        }
    }
    if events.is_empty() {
        return Ok(None);
    }
    Ok(Some(WatchResponse {
        header: header(resp.header()),
        events,
    }))
}

/// Forward etcd watch messages into `tx` until either side is done.
async fn pump(
    mut watcher: etcd_client::Watcher,
    mut stream: etcd_client::WatchStream,
    tx: mpsc::UnboundedSender<WatchItem>,
) {
    loop {
        let message = tokio::select! {
            _ = tx.closed() => break,
            message = stream.message() => message,
        };
        let item = match message {
            Ok(Some(resp)) => match watch_response(&resp) {
                Ok(Some(batch)) => Ok(batch),
                Ok(None) => continue,
                Err(err) => Err(err),
            },
            Ok(None) => break,
            Err(err) => Err(unavailable(err)),
        };
        let failed = item.is_err();
        if tx.send(item).is_err() || failed {
            break;
        }
    }
    if let Err(err) = watcher.cancel().await {
        warn!(error = %err, "failed to cancel etcd watch");
    }
    trace!("etcd watch task exited");
}

#[async_trait]
impl KvClient for Client {
    async fn get(&self, key: &str) -> Result<GetResponse, ClientError> {
        let resp = self.kv_client().get(key, None).await.map_err(unavailable)?;
        get_response(&resp)
    }

    async fn get_prefix(&self, prefix: &str) -> Result<GetResponse, ClientError> {
        let options = etcd_client::GetOptions::new().with_prefix();
        let resp = self
            .kv_client()
            .get(prefix, Some(options))
            .await
            .map_err(unavailable)?;
        get_response(&resp)
    }

    async fn put(&self, key: &str, value: &str) -> Result<PutResponse, ClientError> {
        let resp = self
            .kv_client()
            .put(key, value, None)
            .await
            .map_err(unavailable)?;
        Ok(put_response(&resp))
    }

    async fn delete(&self, key: &str) -> Result<DeleteResponse, ClientError> {
        let resp = self
            .kv_client()
            .delete(key, None)
            .await
            .map_err(unavailable)?;
        Ok(delete_response(&resp))
    }

    async fn txn(&self, request: TxnRequest) -> Result<TxnResponse, ClientError> {
        let resp = self
            .kv_client()
            .txn(txn(request))
            .await
            .map_err(unavailable)?;
        let responses = resp
            .op_responses()
            .into_iter()
            .map(txn_op_response)
            .collect::<Result<_, _>>()?;
        Ok(TxnResponse {
            header: header(resp.header()),
            succeeded: resp.succeeded(),
            responses,
        })
    }

    async fn watch(&self, key: &str, start_revision: i64) -> Result<WatchStream, ClientError> {
        let options = if start_revision > 0 {
            Some(etcd_client::WatchOptions::new().with_start_revision(start_revision))
        } else {
            None
        };
        let (watcher, stream) = self
            .watch_client()
            .watch(key, options)
            .await
            .map_err(unavailable)?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(watcher, stream, tx));
        trace!(key, start_revision, "etcd watch registered");
        Ok(WatchStream::new(rx))
    }
}
