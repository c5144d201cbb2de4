//! ERC-20 transfers over Ethereum JSON-RPC
//!
//! A fresh HTTP provider is built per call; the signer only participates in
//! `transfer`. Confirmation is a receipt poll: once a receipt exists its
//! status decides success vs revert, and the chain head decides depth.

use std::str::FromStr;
use std::time::Duration;
use async_trait::async_trait;
use alloy::network::EthereumWallet;
use alloy::primitives::{Address as ChainAddress, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use url::Url;

use shared::{component_debug, Address, Component};
use crate::config::DisbursementConfig;
use crate::error::{DisburserError, DisburserResult};
use crate::traits::TokenTransfer;
use crate::types::{Confirmation, TokenAmount, TransferHandle};

sol! {
    #[sol(rpc)]
    interface IErc20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}

/// Token client signing with a local private key
pub struct AlloyTokenClient {
    rpc_url: Url,
    token: ChainAddress,
    wallet: EthereumWallet,
    poll_interval: Duration,
}

impl AlloyTokenClient {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

    pub fn new(config: &DisbursementConfig) -> DisburserResult<Self> {
        let signer = PrivateKeySigner::from_str(config.signing_key.expose())
            .map_err(|_| DisburserError::config("PRIVATE_KEY is not a valid secp256k1 key"))?;
        let token = ChainAddress::from_str(&config.token_address).map_err(|e| {
            DisburserError::config(format!("TOKEN_ADDRESS {:?} is invalid: {e}", config.token_address))
        })?;

        component_debug!(Component::Chain, "🔑 Sending from {}", signer.address());

        Ok(Self {
            rpc_url: config.rpc_url.clone(),
            token,
            wallet: EthereumWallet::from(signer),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[async_trait]
impl TokenTransfer for AlloyTokenClient {
    async fn decimals(&self) -> DisburserResult<u8> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.clone());
        let token = IErc20::new(self.token, provider);

        let decimals = token.decimals().call().await.map_err(DisburserError::chain)?._0;
        component_debug!(Component::Chain, "Token {} uses {} decimals", self.token, decimals);
        Ok(decimals)
    }

    async fn transfer(&self, recipient: &Address, amount: TokenAmount) -> DisburserResult<TransferHandle> {
        let to = ChainAddress::from_str(recipient.as_str())
            .map_err(|e| DisburserError::chain(format!("invalid recipient {recipient}: {e}")))?;
        let value = U256::from(amount.base_units()?);

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(self.wallet.clone())
            .on_http(self.rpc_url.clone());
        let token = IErc20::new(self.token, provider);

        let pending = token
            .transfer(to, value)
            .send()
            .await
            .map_err(DisburserError::chain)?;

        let tx_hash = format!("{:#x}", pending.tx_hash());
        component_debug!(Component::Chain, "📤 Submitted {} to {} in {}", amount, recipient, tx_hash);

        Ok(TransferHandle {
            recipient: recipient.clone(),
            tx_hash,
        })
    }

    async fn await_confirmation(&self, handle: &TransferHandle, confirmations: u64) -> DisburserResult<Confirmation> {
        let hash = TxHash::from_str(&handle.tx_hash)
            .map_err(|e| DisburserError::chain(format!("invalid transaction hash {}: {e}", handle.tx_hash)))?;
        let provider = ProviderBuilder::new().on_http(self.rpc_url.clone());

        loop {
            let receipt = provider
                .get_transaction_receipt(hash)
                .await
                .map_err(DisburserError::chain)?;

            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Err(DisburserError::TransferReverted {
                        recipient: handle.recipient.clone(),
                        tx_hash: handle.tx_hash.clone(),
                    });
                }

                if let Some(mined_at) = receipt.block_number {
                    let head = provider.get_block_number().await.map_err(DisburserError::chain)?;
                    let depth = head.saturating_sub(mined_at) + 1;
                    if depth >= confirmations {
                        return Ok(Confirmation {
                            tx_hash: handle.tx_hash.clone(),
                            block_number: Some(mined_at),
                        });
                    }
                    component_debug!(Component::Chain, "⏳ {} at depth {}/{}", handle.tx_hash, depth, confirmations);
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
