//! Contract bindings for the signal oracle

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ISignalOracle {
        event SignalBatchPublished(
            uint256 indexed batchId,
            uint64 windowStart,
            uint64 windowEnd,
            string[3] top3Signals,
            string cid,
            string source,
            address indexed publisher
        );

        function publishSignalBatch(
            uint64 windowStart,
            uint64 windowEnd,
            string[3] calldata top3Signals,
            string calldata cid,
            string calldata source
        ) external returns (uint256);

        function getLatestSignals()
            external
            view
            returns (string[3] memory top3Signals, string memory cid, uint64 windowEnd);

        function getBatchCount() external view returns (uint256);
    }
}
