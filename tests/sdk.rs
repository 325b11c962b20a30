//! End-to-end flows over the mock transport: the whole stack from typed
//! input to broadcast envelope and back, without a live network.

use idos::prelude::*;
use idos::core::rand::thread_rng;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn action_client() -> (ActionClient<MockTransport, LocalWallet>, MockTransport) {
    let mock = MockTransport::new();
    let provider = Provider::new(mock.clone());
    let wallet = LocalWallet::new(&mut thread_rng());
    (ActionClient::new(provider, wallet, "idos-testnet"), mock)
}

#[tokio::test]
async fn add_wallet_signs_and_broadcasts() {
    let (client, mock) = action_client();
    mock.push(json!({"balance": "0", "nonce": 41})).unwrap();
    mock.push(json!({"tx_hash": "3q0=", "result": {"code": 0, "gas": 12}})).unwrap();

    let input = AddWallet {
        id: USER_ID.parse().unwrap(),
        address: "0x89205a3a3b2a69de6dbf7f01ed13b2108b2c43e7".into(),
        wallet_type: Some("EVM".into()),
        ..Default::default()
    };
    let tx_hash = client
        .execute(&idos::client::actions::wallets::ADD, &input, BroadcastSync::WaitForCommit)
        .await
        .unwrap();
    assert_eq!(tx_hash, hex::encode([0xde, 0xad]));

    mock.assert_request("user.account").unwrap();
    let broadcast = mock.assert_request("user.broadcast").unwrap();
    assert_eq!(broadcast["tx"]["body"]["nonce"], 42);
    assert_eq!(broadcast["tx"]["body"]["type"], "execute");
    assert_eq!(broadcast["tx"]["serialization"], "concat");
    assert_eq!(broadcast["sync"], 1);
}

#[tokio::test]
async fn full_enclave_credential_flow() {
    let user_id: Uuid = USER_ID.parse().unwrap();
    let orchestrator = EnclaveOrchestrator::new(Enclave::new(MemoryKeyStore::new(), KeyKind::User));

    let public = orchestrator
        .unlock(&user_id, "correct horse battery staple", Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(orchestrator.state(), EnclaveState::Unlocked);

    let sealed = orchestrator
        .with_enclave(|enclave| async move { enclave.encrypt(b"hello", &public).await })
        .await
        .unwrap()
        .0;
    let plaintext = orchestrator
        .with_enclave(|enclave| {
            let sealed = sealed.clone();
            async move { enclave.decrypt(&sealed, &public).await }
        })
        .await
        .unwrap();
    assert_eq!(plaintext, b"hello");

    orchestrator.lock().await;
    let locked = orchestrator
        .with_enclave(|enclave| {
            let sealed = sealed.clone();
            async move { enclave.decrypt(&sealed, &public).await }
        })
        .await;
    assert!(matches!(locked, Err(EnclaveError::NoKey)));
}

#[tokio::test]
async fn recovered_secret_feeds_the_enclave() {
    let user_id: Uuid = USER_ID.parse().unwrap();

    // split the secret the way an upload would, then recombine a quorum
    // and install it, as the download path does
    let secret = idos::crypto::random_bytes::<32>();
    let shares = split(&secret, 4, 2).unwrap();
    let recovered = combine(&shares[1..3]).unwrap();
    assert_eq!(recovered.as_slice(), &secret[..]);

    let enclave = Enclave::new(MemoryKeyStore::new(), KeyKind::Mpc);
    let installed: [u8; 32] = recovered.as_slice().try_into().unwrap();
    let public = enclave
        .import_key(&user_id, &installed, ExpirationPolicy::Session, None)
        .await
        .unwrap();

    let (sealed, _) = enclave.encrypt(b"recovered", &public).await.unwrap();
    assert_eq!(enclave.decrypt(&sealed, &public).await.unwrap(), b"recovered");
}

#[test]
fn signable_message_matches_canonical_template() {
    let mut tx = idos::types::Transaction::unsigned(
        hex::decode("deadbeef").unwrap(),
        SignatureType::Secp256k1Personal,
        idos::types::Bytes::from(vec![0u8; 20]),
        1,
        "c",
    );
    tx.body.desc = "x".to_owned();

    let digest = idos::utils::sha256(hex::decode("deadbeef").unwrap());
    let expected = format!(
        "x\n\nPayloadType: execute\nPayloadDigest: {}\nFee: 0\nNonce: 1\n\nKwil Chain ID: c\n",
        hex::encode(&digest[..20]),
    );
    assert_eq!(tx.signable_message(), expected);
}
