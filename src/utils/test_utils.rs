//! Fixtures shared by the unit tests.

#[cfg(test)]
pub mod utils {
    use crate::core::transaction::Transaction;
    use crate::core::witness::Witness;
    use crate::network::client::InvokeResult;
    use crate::network::local_client::LocalClient;
    use crate::types::fixed8::Fixed8;
    use crate::virtual_machine::script_builder::ScriptBuilder;

    pub const SIG_INVOCATION: &str = "40f52d1206315dfac64c14ec2dfef1edd62f4460487c23be6bbbbf9080973784ca7dbfe4dfcf4b6b82f2921b968e0d693020b76be0b20171ac56e7da50ab1c4b06";
    pub const SIG_VERIFICATION: &str = "21031d8e1630ce640966967bc6d95223d21f44304133003140c3b52004dc981349c968747476aa";
    pub const MULTISIG_INVOCATION: &str = "40f52d1206315dfac64c14ec2dfef1edd62f4460487c23be6bbbbf9080973784ca7dbfe4dfcf4b6b82f2921b968e0d693020b76be0b20171ac56e7da50ab1c4b0640efe3ccf3a49dd670d8785a12218324f60a6b56ed5a628f15522b883a81b51ea9256c0be62008377b156eb1a76e6dc25aad776524c18eb01b0810ed833b15a1ca";
    pub const MULTISIG_VERIFICATION: &str = "5221031d8e1630ce640966967bc6d95223d21f44304133003140c3b52004dc981349c92103767002bb9f74317035ce8d557a3aed30ce831eb16b5f636a139dad0b07916bed210329898e6e5e0a2f175e205b4019c500d6bb69203b56470ec2fc8ab0a4c065e16d5368c7c34cba";

    /// Fee rate used by the fixtures: 0.00001 per byte.
    pub const FEE_PER_BYTE: Fixed8 = Fixed8::from_raw(1000);

    fn witness(invocation: &str, verification: &str) -> Witness {
        Witness::new(
            hex::decode(invocation).unwrap(),
            hex::decode(verification).unwrap(),
        )
    }

    /// Empty transaction carrying one single-signature and one 2-of-3
    /// multi-signature witness.
    pub fn fixture_transaction() -> Transaction {
        let mut tx = Transaction::new();
        tx.add_witness(witness(SIG_INVOCATION, SIG_VERIFICATION))
            .add_witness(witness(MULTISIG_INVOCATION, MULTISIG_VERIFICATION));
        tx
    }

    /// Calls `name` on the NEO contract.
    pub fn name_script() -> Vec<u8> {
        let mut sb = ScriptBuilder::new();
        sb.emit_app_call("NEO", Some("name"), &[]).unwrap();
        sb.build()
    }

    /// Client at `height` whose scripts halt after consuming `gas`.
    pub fn mock_client(height: u32, gas: Fixed8) -> LocalClient {
        LocalClient::new(height, FEE_PER_BYTE).with_invoke_result(InvokeResult::halt(gas))
    }
}
