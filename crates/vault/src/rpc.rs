use super::chain::Chain;
use super::chain::Transfer;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signature::Signature;
use solana_sdk::signer::Signer;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::UiTransactionEncoding;

/// Production [`Chain`] backed by a Solana RPC node.
pub struct RpcChain {
    client: RpcClient,
}

impl RpcChain {
    pub fn new(url: String) -> Self {
        Self {
            client: RpcClient::new(url),
        }
    }
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("RPC_URL").unwrap_or_else(|_| "https://api.devnet.solana.com".to_string()),
        )
    }
}

impl Chain for RpcChain {
    async fn balance(&self, address: &Pubkey) -> anyhow::Result<u64> {
        Ok(self.client.get_balance(address).await?)
    }

    async fn transfer(
        &self,
        from: &Keypair,
        to: &Pubkey,
        lamports: u64,
    ) -> anyhow::Result<Signature> {
        let blockhash = self.client.get_latest_blockhash().await?;
        let instruction = system_instruction::transfer(&from.pubkey(), to, lamports);
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&from.pubkey()),
            &[from],
            blockhash,
        );
        Ok(self.client.send_and_confirm_transaction(&transaction).await?)
    }

    async fn lookup(&self, signature: &Signature) -> anyhow::Result<Option<Transfer>> {
        let confirmed = match self
            .client
            .get_transaction(signature, UiTransactionEncoding::Base64)
            .await
        {
            Ok(confirmed) => confirmed,
            // unknown signatures surface as RPC errors, not as a payload
            Err(e) => {
                log::debug!("transaction lookup failed for {}: {}", signature, e);
                return Ok(None);
            }
        };
        let Some(meta) = confirmed.transaction.meta else {
            return Ok(None);
        };
        let Some(decoded) = confirmed.transaction.transaction.decode() else {
            return Ok(None);
        };
        let keys = decoded.message.static_account_keys();
        let Some(source) = keys.first().copied() else {
            return Ok(None);
        };
        // the receiving account is the one with the largest balance gain;
        // on a plain system transfer that is exactly the destination
        let mut destination = source;
        let mut lamports = 0u64;
        for (i, key) in keys.iter().enumerate() {
            let pre = meta.pre_balances.get(i).copied().unwrap_or(0);
            let post = meta.post_balances.get(i).copied().unwrap_or(0);
            if post > pre && post - pre > lamports {
                lamports = post - pre;
                destination = *key;
            }
        }
        Ok(Some(Transfer {
            source,
            destination,
            lamports,
            succeeded: meta.err.is_none(),
        }))
    }

    async fn rent_exempt_minimum(&self) -> anyhow::Result<u64> {
        Ok(self
            .client
            .get_minimum_balance_for_rent_exemption(0)
            .await?)
    }
}
